//! Configuration for the backend client and form defaults

use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;
use log::debug;

/// Backend address used when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Upstream LLM endpoint pre-filled in the optimize form
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";

pub const ENV_API_URL: &str = "PROMPT_OPTIMIZER_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "PROMPT_OPTIMIZER_TIMEOUT_SECS";
pub const ENV_CATALOG_TIMEOUT_SECS: &str
  = "PROMPT_OPTIMIZER_CATALOG_TIMEOUT_SECS";
pub const ENV_FAIL_OPEN: &str = "PROMPT_OPTIMIZER_FAIL_OPEN";
pub const ENV_VERBOSE: &str = "PROMPT_OPTIMIZER_VERBOSE";

/// Client configuration, fixed once per process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig
{   /// Backend base URL
    pub base_url: String
  , /// Timeout for optimize and generate, in seconds
    pub request_timeout_secs: u64
  , /// Timeout for validate, catalog and health calls, in seconds
    pub catalog_timeout_secs: u64
  , /// Treat an unreachable advisory validator as "valid"
    pub fail_open_validation: bool
  , /// Enable detailed logging
    pub verbose: bool
}

impl Default for ClientConfig
{   fn default() -> Self
    {   ClientConfig
        {   base_url: DEFAULT_API_URL.to_string()
          , request_timeout_secs: 120
          , catalog_timeout_secs: 30
          , fail_open_validation: true
          , verbose: false
        }
    }
}

impl ClientConfig
{   /// Build a config pointing at `base_url` with default timeouts
    pub fn with_base_url(base_url: impl Into<String>) -> Self
    {   ClientConfig
        {   base_url: base_url.into()
          , ..ClientConfig::default()
        }
    }

    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self, crate::error::Error>
    {   let defaults = ClientConfig::default();
        let config = ClientConfig
        {   base_url: std::env::var(ENV_API_URL)
              .unwrap_or(defaults.base_url)
          , request_timeout_secs: env_parse(
              ENV_TIMEOUT_SECS,
              defaults.request_timeout_secs
            )?
          , catalog_timeout_secs: env_parse(
              ENV_CATALOG_TIMEOUT_SECS,
              defaults.catalog_timeout_secs
            )?
          , fail_open_validation: env_parse(
              ENV_FAIL_OPEN,
              defaults.fail_open_validation
            )?
          , verbose: env_parse(ENV_VERBOSE, defaults.verbose)?
        };
        debug!("Loaded client config from env: {}", config.base_url);
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file; missing keys take defaults
    pub fn from_file(path: &str) -> Result<Self, crate::error::Error>
    {   let content = fs::read_to_string(path)?;
        let config: ClientConfig = serde_json::from_str(&content)
          .map_err(|e| crate::error::Error::ParseError(e.to_string()))?;
        debug!("Loaded client config from {}", path);
        config.validate()?;
        Ok(config)
    }

    /// Reject values no client can work with
    pub fn validate(&self) -> Result<(), crate::error::Error>
    {   if self.base_url.trim().is_empty()
        {   return Err(crate::error::Error::InvalidConfiguration(
              "base_url must not be empty".to_string()
            ));
        }
        if !self.base_url.starts_with("http://")
          && !self.base_url.starts_with("https://")
        {   return Err(crate::error::Error::InvalidConfiguration(
              format!("base_url must be http(s): {}", self.base_url)
            ));
        }
        if self.request_timeout_secs == 0
          || self.catalog_timeout_secs == 0
        {   return Err(crate::error::Error::InvalidConfiguration(
              "timeouts must be at least one second".to_string()
            ));
        }
        Ok(())
    }

    /// Base URL without a trailing slash
    pub fn api_base(&self) -> &str
    {   self.base_url.trim_end_matches('/')
    }

    pub fn request_timeout(&self) -> Duration
    {   Duration::from_secs(self.request_timeout_secs)
    }

    pub fn catalog_timeout(&self) -> Duration
    {   Duration::from_secs(self.catalog_timeout_secs)
    }

    /// Log filter used when RUST_LOG is unset
    pub fn default_log_filter(&self) -> &'static str
    {   if self.verbose { "debug" } else { "error" }
    }
}

fn env_parse<T: std::str::FromStr>(
  key: &str
, default: T
) -> Result<T, crate::error::Error>
{   match std::env::var(key)
    {   Ok(raw) => raw.trim().parse().map_err(|_| {
          crate::error::Error::InvalidConfiguration(
            format!("{} has an invalid value: {}", key, raw)
          )
        })
      , Err(_) => Ok(default)
    }
}

/// Initial values of the two forms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormDefaults
{   pub model: String
  , pub optimization_goal: String
  , pub max_tokens: u32
  , pub llm_base_url: String
  , pub task_type: String
  , pub output_format: String
}

impl Default for FormDefaults
{   fn default() -> Self
    {   FormDefaults
        {   model: "gpt-4.1".to_string()
          , optimization_goal: "general".to_string()
          , max_tokens: 2000
          , llm_base_url: DEFAULT_LLM_BASE_URL.to_string()
          , task_type: "general".to_string()
          , output_format: "text".to_string()
        }
    }
}
