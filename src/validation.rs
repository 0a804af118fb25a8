//! Form state, pre-flight validation and request building.
//!
//! Raw form text goes in, a well-formed request (or the reason it
//! cannot be submitted yet) comes out. Blank optional text becomes
//! `None` so the backend applies its own defaults.

use std::future::Future;
use serde::{Deserialize, Serialize};
use log::{debug, warn};

use crate::config::FormDefaults;
use crate::error::{Field, TransportError, ValidationError};
use crate::request::{GenerateRequest, OptimizeRequest, ValidationResult};

pub const MIN_PROMPT_CHARS: usize = 3;
pub const MAX_PROMPT_CHARS: usize = 4000;

/// Remote pre-flight check used by the optimize path
pub trait PromptChecker
{   fn check_prompt(
      &self
    , prompt: &str
    ) -> impl Future<Output = Result<ValidationResult, TransportError>>
      + Send;
}

impl PromptChecker for crate::client::ApiClient
{   async fn check_prompt(
      &self
    , prompt: &str
    ) -> Result<ValidationResult, TransportError>
    {   self.validate_prompt(prompt).await
    }
}

/// What to do when the advisory check itself cannot run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdvisoryPolicy
{   /// Treat the prompt as valid
    FailOpen
  , /// Block submission with the transport message
    FailClosed
}

impl AdvisoryPolicy
{   pub fn from_fail_open(fail_open: bool) -> Self
    {   if fail_open { AdvisoryPolicy::FailOpen }
        else { AdvisoryPolicy::FailClosed }
    }
}

/// Local checks on a prompt. Returns the trimmed text.
pub fn check_prompt_locally(raw: &str) -> Result<&str, ValidationError>
{   let prompt = raw.trim();
    if prompt.is_empty()
    {   return Err(ValidationError::EmptyInput(Field::Prompt));
    }
    let chars = prompt.chars().count();
    if chars < MIN_PROMPT_CHARS
    {   return Err(ValidationError::TooShort);
    }
    if chars > MAX_PROMPT_CHARS
    {   return Err(ValidationError::TooLong);
    }
    if !prompt.chars().any(|c| c.is_ascii_alphanumeric())
    {   return Err(ValidationError::NoAlphanumeric);
    }
    Ok(prompt)
}

/// Full optimize-path validation: local checks, then the advisory
/// remote check. Returns the trimmed prompt.
pub async fn validate_for_optimize<C: PromptChecker>(
  raw: &str
, checker: &C
, policy: AdvisoryPolicy
) -> Result<String, ValidationError>
{   let prompt = check_prompt_locally(raw)?;

    match checker.check_prompt(prompt).await
    {   Ok(result) if result.is_valid => {
          debug!("Remote validation passed");
          Ok(prompt.to_string())
        }
      , Ok(result) => {
          debug!(
            "Remote validation rejected prompt: {} issue(s)",
            result.issues.len()
          );
          Err(ValidationError::Rejected(result.issues.join(", ")))
        }
      , Err(e) => match policy
        {   AdvisoryPolicy::FailOpen => {
              warn!("Advisory validation unavailable, proceeding: {}", e);
              Ok(prompt.to_string())
            }
          , AdvisoryPolicy::FailClosed => {
              warn!("Advisory validation unavailable, blocking: {}", e);
              Err(ValidationError::Unverified(e.to_string()))
            }
        }
    }
}

/// Blank after trimming becomes `None`
pub fn normalize_optional(raw: &str) -> Option<String>
{   let trimmed = raw.trim();
    if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
}

/// Drops blank entries; an empty result becomes `None`
pub fn normalize_examples(raw: &[String]) -> Option<Vec<String>>
{   let kept: Vec<String> = raw.iter()
      .map(|e| e.trim())
      .filter(|e| !e.is_empty())
      .map(str::to_string)
      .collect();
    if kept.is_empty() { None } else { Some(kept) }
}

/// Integer text to a token budget. Blank, non-numeric and zero are
/// omitted; range hints are advisory and not enforced here.
pub fn parse_max_tokens(raw: &str) -> Option<u32>
{   raw.trim().parse::<u32>().ok().filter(|n| *n > 0)
}

/// Raw contents of the optimize form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizeForm
{   pub prompt: String
  , pub model: String
  , pub custom_model: String
  , pub use_custom_model: bool
  , pub context: String
  , pub optimization_goal: String
  , pub max_tokens: String
  , pub api_key: String
  , pub base_url: String
}

impl Default for OptimizeForm
{   fn default() -> Self
    {   OptimizeForm::with_defaults(&FormDefaults::default())
    }
}

impl OptimizeForm
{   pub fn with_defaults(defaults: &FormDefaults) -> Self
    {   OptimizeForm
        {   prompt: String::new()
          , model: defaults.model.clone()
          , custom_model: String::new()
          , use_custom_model: false
          , context: String::new()
          , optimization_goal: defaults.optimization_goal.clone()
          , max_tokens: defaults.max_tokens.to_string()
          , api_key: String::new()
          , base_url: defaults.llm_base_url.clone()
        }
    }

    /// Custom model text when the manual toggle is on
    pub fn selected_model(&self) -> String
    {   if self.use_custom_model
        {   self.custom_model.trim().to_string()
        } else
        {   self.model.clone()
        }
    }

    pub fn char_count(&self) -> usize
    {   self.prompt.chars().count()
    }

    pub fn word_count(&self) -> usize
    {   self.prompt.split_whitespace().count()
    }

    /// Submit control is enabled only for non-blank prompts
    pub fn can_submit(&self) -> bool
    {   !self.prompt.trim().is_empty()
    }

    /// Local checks plus normalization, no remote call
    pub fn build(&self) -> Result<OptimizeRequest, ValidationError>
    {   let prompt = check_prompt_locally(&self.prompt)?;
        Ok(self.request_for(prompt.to_string()))
    }

    /// Local checks, advisory remote check, then normalization
    pub async fn prepare<C: PromptChecker>(
      &self
    , checker: &C
    , policy: AdvisoryPolicy
    ) -> Result<OptimizeRequest, ValidationError>
    {   let prompt
          = validate_for_optimize(&self.prompt, checker, policy).await?;
        Ok(self.request_for(prompt))
    }

    fn request_for(&self, prompt: String) -> OptimizeRequest
    {   OptimizeRequest
        {   prompt
          , model: self.selected_model()
          , context: normalize_optional(&self.context)
          , optimization_goal: self.optimization_goal.clone()
          , max_tokens: parse_max_tokens(&self.max_tokens)
          , api_key: normalize_optional(&self.api_key)
          , base_url: normalize_optional(&self.base_url)
        }
    }
}

/// Raw contents of the generate form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateForm
{   pub requirements: String
  , pub task_type: String
  , pub output_format: String
  , pub context: String
  , pub constraints: String
  , /// Always at least one row
    pub examples: Vec<String>
  , pub model: String
  , pub max_tokens: String
  , pub api_key: String
  , pub base_url: String
}

impl Default for GenerateForm
{   fn default() -> Self
    {   GenerateForm::with_defaults(&FormDefaults::default())
    }
}

impl GenerateForm
{   pub fn with_defaults(defaults: &FormDefaults) -> Self
    {   GenerateForm
        {   requirements: String::new()
          , task_type: defaults.task_type.clone()
          , output_format: defaults.output_format.clone()
          , context: String::new()
          , constraints: String::new()
          , examples: vec![String::new()]
          , model: defaults.model.clone()
          , max_tokens: defaults.max_tokens.to_string()
          , api_key: String::new()
          , base_url: String::new()
        }
    }

    pub fn add_example(&mut self)
    {   self.examples.push(String::new());
    }

    pub fn set_example(&mut self, index: usize, value: &str)
    {   if let Some(slot) = self.examples.get_mut(index)
        {   *slot = value.to_string();
        }
    }

    /// The last remaining row is never removed
    pub fn remove_example(&mut self, index: usize)
    {   if self.examples.len() > 1 && index < self.examples.len()
        {   self.examples.remove(index);
        }
    }

    /// Requirements check plus normalization; no remote pre-check
    pub fn build(&self) -> Result<GenerateRequest, ValidationError>
    {   let requirements = self.requirements.trim();
        if requirements.is_empty()
        {   return Err(ValidationError::EmptyInput(Field::Requirements));
        }
        Ok(GenerateRequest
        {   requirements: requirements.to_string()
          , task_type: self.task_type.clone()
          , output_format: self.output_format.clone()
          , context: normalize_optional(&self.context)
          , constraints: normalize_optional(&self.constraints)
          , examples: normalize_examples(&self.examples)
          , model: self.model.clone()
          , max_tokens: parse_max_tokens(&self.max_tokens)
          , api_key: normalize_optional(&self.api_key)
          , base_url: normalize_optional(&self.base_url)
        })
    }
}
