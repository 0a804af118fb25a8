use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend operation a transport failure belongs to.
/// Carries the user-facing wording for every failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation
{   Optimize
  , Generate
  , Validate
  , Models
  , OptimizationTypes
  , TaskTypes
  , OutputFormats
  , Health
}

impl Operation
{   /// Message used when the per-call timeout elapses
    pub fn timeout_message(&self) -> String
    {   match self
        {   Operation::Optimize | Operation::Generate => {
              "Request timeout - the OpenAI API is taking too long \
               to respond. Please try again or check your API key."
                .to_string()
            }
          , Operation::Validate => {
              "Request timeout - validation is taking too long. \
               Please try again."
                .to_string()
            }
          , Operation::Health => {
              "Health check timeout - unable to reach backend service."
                .to_string()
            }
          , Operation::Models
          | Operation::OptimizationTypes
          | Operation::TaskTypes
          | Operation::OutputFormats => {
              format!(
                "Request timeout - unable to fetch {}. \
                 Please check your connection.",
                self.catalog_noun()
              )
            }
        }
    }

    /// Prefix of the generic "<prefix>: <detail>" message
    pub fn failure_prefix(&self) -> String
    {   match self
        {   Operation::Optimize | Operation::Generate => {
              "Request failed".to_string()
            }
          , Operation::Validate => "Validation failed".to_string()
          , Operation::Health => "Health check failed".to_string()
          , _ => format!("Failed to fetch {}", self.catalog_noun())
        }
    }

    fn catalog_noun(&self) -> &'static str
    {   match self
        {   Operation::Models => "models"
          , Operation::OptimizationTypes => "optimization types"
          , Operation::TaskTypes => "task types"
          , Operation::OutputFormats => "output formats"
          , Operation::Optimize => "optimization"
          , Operation::Generate => "generation"
          , Operation::Validate => "validation"
          , Operation::Health => "health"
        }
    }
}

impl fmt::Display for Operation
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   let name = match self
        {   Operation::Optimize => "optimize"
          , Operation::Generate => "generate"
          , Operation::Validate => "validate"
          , Operation::Models => "models"
          , Operation::OptimizationTypes => "optimization-types"
          , Operation::TaskTypes => "task-types"
          , Operation::OutputFormats => "output-formats"
          , Operation::Health => "health"
        };
        write!(f, "{}", name)
    }
}

/// What went wrong on the wire, before translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure
{   /// The per-call timeout elapsed
    TimedOut
  , /// Backend answered with a non-success status
    Status
    {   code: u16
      , detail: Option<String>
    }
  , /// Connection refused, malformed body, anything else
    Other(String)
}

/// Remote failure, already classified for display.
/// `Display` yields the one human-readable string callers show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError
{   /// Per-call timeout elapsed
    Timeout(Operation)
  , /// Backend answered with status >= 500
    Server
    {   operation: Operation
      , status: u16
    }
  , /// Backend answered with 401
    Unauthorized(Operation)
  , /// Every other failure, with the server detail or raw message
    Failed
    {   operation: Operation
      , detail: String
    }
}

impl TransportError
{   /// Shared translation table applied to every operation.
    /// Order matters: timeout, then >= 500, then 401, then the rest.
    pub fn classify(operation: Operation, failure: Failure) -> Self
    {   match failure
        {   Failure::TimedOut => TransportError::Timeout(operation)
          , Failure::Status { code, .. } if code >= 500 => {
              TransportError::Server { operation, status: code }
            }
          , Failure::Status { code: 401, .. } => {
              TransportError::Unauthorized(operation)
            }
          , Failure::Status { code, detail } => {
              TransportError::Failed
              {   operation
                , detail: detail.unwrap_or_else(|| {
                    format!("Request failed with status code {}", code)
                  })
              }
            }
          , Failure::Other(message) => {
              TransportError::Failed { operation, detail: message }
            }
        }
    }

    pub fn operation(&self) -> Operation
    {   match self
        {   TransportError::Timeout(op)
          | TransportError::Unauthorized(op) => *op
          , TransportError::Server { operation, .. }
          | TransportError::Failed { operation, .. } => *operation
        }
    }

    pub fn is_timeout(&self) -> bool
    {   matches!(self, TransportError::Timeout(_))
    }
}

impl fmt::Display for TransportError
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   match self
        {   TransportError::Timeout(op) => {
              write!(f, "{}", op.timeout_message())
            }
          , TransportError::Server { .. } => {
              write!(f,
                "Server error - please check if the backend service \
                 is running and your API key is valid."
              )
            }
          , TransportError::Unauthorized(_) => {
              write!(f,
                "Authentication failed - please check your OpenAI API key."
              )
            }
          , TransportError::Failed { operation, detail } => {
              write!(f, "{}: {}", operation.failure_prefix(), detail)
            }
        }
    }
}

impl std::error::Error for TransportError {}

/// Form field a validation error is shown next to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field
{   Prompt
  , Requirements
}

/// Local pre-flight failure. Blocks submission; never reaches
/// the transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError
{   /// Field is empty after trimming
    EmptyInput(Field)
  , /// Prompt shorter than the minimum length
    TooShort
  , /// Prompt longer than the maximum length
    TooLong
  , /// Prompt has no ASCII letter or digit
    NoAlphanumeric
  , /// Remote check ran and reported issues (joined)
    Rejected(String)
  , /// Remote check could not run and the policy is fail-closed
    Unverified(String)
}

impl ValidationError
{   pub fn field(&self) -> Field
    {   match self
        {   ValidationError::EmptyInput(field) => *field
          , _ => Field::Prompt
        }
    }
}

impl fmt::Display for ValidationError
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   match self
        {   ValidationError::EmptyInput(Field::Prompt) => {
              write!(f, "Please enter a prompt to optimize")
            }
          , ValidationError::EmptyInput(Field::Requirements) => {
              write!(f, "Please provide requirements for prompt generation")
            }
          , ValidationError::TooShort => {
              write!(f, "Prompt is too short")
            }
          , ValidationError::TooLong => {
              write!(f, "Prompt is too long")
            }
          , ValidationError::NoAlphanumeric => {
              write!(f, "Prompt contains no alphanumeric characters")
            }
          , ValidationError::Rejected(issues) => {
              write!(f, "{}", issues)
            }
          , ValidationError::Unverified(msg) => {
              write!(f, "{}", msg)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Crate-level error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// Input rejected before dispatch
    Validation(ValidationError)
  , /// Remote call failed
    Transport(TransportError)
  , /// Invalid configuration
    InvalidConfiguration(String)
  , /// Reading or writing a local file failed
    Io(String)
  , /// Failed to parse local data (config file, exported document)
    ParseError(String)
  , /// Session task is gone
    SessionClosed
  , /// Generic error
    Other(String)
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::Validation(e) => write!(f, "{}", e)
          , Error::Transport(e) => write!(f, "{}", e)
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::Io(msg) => write!(f, "I/O error: {}", msg)
          , Error::ParseError(msg) => {
              write!(f, "Parse error: {}", msg)
            }
          , Error::SessionClosed => {
              write!(f, "Session is no longer running")
            }
          , Error::Other(msg) => write!(f, "Error: {}", msg)
        }
    }
}

impl std::error::Error for Error {}

impl From<ValidationError> for Error
{   fn from(e: ValidationError) -> Self
    {   Error::Validation(e)
    }
}

impl From<TransportError> for Error
{   fn from(e: TransportError) -> Self
    {   Error::Transport(e)
    }
}

impl From<std::io::Error> for Error
{   fn from(e: std::io::Error) -> Self
    {   Error::Io(e.to_string())
    }
}

impl From<String> for Error
{   fn from(s: String) -> Self
    {   Error::Other(s)
    }
}

impl From<&str> for Error
{   fn from(s: &str) -> Self
    {   Error::Other(s.to_string())
    }
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn timeout_wins_over_everything()
    {   let err = TransportError::classify(
          Operation::Optimize, Failure::TimedOut
        );
        assert_eq!(
          err.to_string(),
          "Request timeout - the OpenAI API is taking too long to \
           respond. Please try again or check your API key."
        );
        assert!(err.is_timeout());
    }

    #[test]
    fn unauthorized_ignores_detail()
    {   let err = TransportError::classify(
          Operation::Generate,
          Failure::Status
          {   code: 401
            , detail: Some("Invalid key sk-123".to_string())
          }
        );
        assert_eq!(
          err.to_string(),
          "Authentication failed - please check your OpenAI API key."
        );
    }

    #[test]
    fn server_errors_cover_every_5xx()
    {   for code in [500, 502, 503, 504, 599]
        {   let err = TransportError::classify(
              Operation::Models,
              Failure::Status { code, detail: None }
            );
            assert_eq!(
              err,
              TransportError::Server
              {   operation: Operation::Models
                , status: code
              }
            );
            assert!(err.to_string().starts_with("Server error - "));
        }
    }

    #[test]
    fn other_status_uses_detail_or_status_line()
    {   let with_detail = TransportError::classify(
          Operation::TaskTypes,
          Failure::Status
          {   code: 404
            , detail: Some("Not Found".to_string())
          }
        );
        assert_eq!(
          with_detail.to_string(),
          "Failed to fetch task types: Not Found"
        );

        let without = TransportError::classify(
          Operation::Health,
          Failure::Status { code: 403, detail: None }
        );
        assert_eq!(
          without.to_string(),
          "Health check failed: Request failed with status code 403"
        );
    }

    #[test]
    fn network_failures_keep_raw_message()
    {   let err = TransportError::classify(
          Operation::Validate,
          Failure::Other("connection refused".to_string())
        );
        assert_eq!(
          err.to_string(),
          "Validation failed: connection refused"
        );
        assert_eq!(err.operation(), Operation::Validate);
    }

    #[test]
    fn catalog_timeouts_name_the_catalog()
    {   assert_eq!(
          Operation::OutputFormats.timeout_message(),
          "Request timeout - unable to fetch output formats. \
           Please check your connection."
        );
        assert_eq!(
          Operation::Health.timeout_message(),
          "Health check timeout - unable to reach backend service."
        );
    }

    #[test]
    fn validation_messages_match_the_form()
    {   assert_eq!(
          ValidationError::EmptyInput(Field::Prompt).to_string(),
          "Please enter a prompt to optimize"
        );
        assert_eq!(ValidationError::TooShort.to_string(),
          "Prompt is too short");
        assert_eq!(
          ValidationError::EmptyInput(Field::Requirements).field(),
          Field::Requirements
        );
    }
}
