//! Serializable view state and the transitions that update it.
//!
//! The state is replaced, never patched in place: every change goes
//! through [`ViewState::apply`], which consumes the old value.

use serde::{Deserialize, Serialize};
use log::trace;

use crate::error::{Field, ValidationError};
use crate::request::{GenerateResponse, OptimizeResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tab
{   #[default]
    Optimize
  , Generate
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity
{   Success
  , Info
  , Warning
  , Error
}

/// Short-lived global message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice
{   pub message: String
  , pub severity: Severity
}

/// Inline error attached to one form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError
{   pub field: Field
  , pub message: String
}

/// Successful payload of a round trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Outcome
{   Optimized(OptimizeResponse)
  , Generated(GenerateResponse)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Transition
{   SelectTab(Tab)
  , RequestStarted
  , RequestSucceeded(Outcome)
  , RequestFailed(String)
  , ValidationFailed(FieldError)
  , ValidationPassed
  , DismissError
  , DismissNotice
}

impl From<&ValidationError> for FieldError
{   fn from(e: &ValidationError) -> Self
    {   FieldError
        {   field: e.field()
          , message: e.to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewState
{   pub tab: Tab
  , /// A round trip is in flight; submit controls are disabled
    pub loading: bool
  , pub optimize_result: Option<OptimizeResponse>
  , pub generate_result: Option<GenerateResponse>
  , /// Dismissible banner for transport failures
    pub error: Option<String>
  , pub field_error: Option<FieldError>
  , pub notice: Option<Notice>
}

impl ViewState
{   pub fn apply(self, transition: Transition) -> Self
    {   trace!("View transition: {:?}", transition);
        match transition
        {   Transition::SelectTab(tab) => ViewState
            {   tab
              , error: None
              , ..self
            }
          , Transition::RequestStarted => ViewState
            {   loading: true
              , error: None
              , ..self
            }
          , Transition::RequestSucceeded(Outcome::Optimized(result)) => {
              ViewState
              {   loading: false
                , optimize_result: Some(result)
                , notice: Some(Notice
                  {   message: "Prompt optimized successfully!".to_string()
                    , severity: Severity::Success
                  })
                , ..self
              }
            }
          , Transition::RequestSucceeded(Outcome::Generated(result)) => {
              ViewState
              {   loading: false
                , generate_result: Some(result)
                , notice: Some(Notice
                  {   message: "Prompt generated successfully!".to_string()
                    , severity: Severity::Success
                  })
                , ..self
              }
            }
          , Transition::RequestFailed(message) => ViewState
            {   loading: false
              , error: Some(message.clone())
              , notice: Some(Notice
                {   message
                  , severity: Severity::Error
                })
              , ..self
            }
          , Transition::ValidationFailed(field_error) => ViewState
            {   field_error: Some(field_error)
              , ..self
            }
          , Transition::ValidationPassed => ViewState
            {   field_error: None
              , ..self
            }
          , Transition::DismissError => ViewState
            {   error: None
              , ..self
            }
          , Transition::DismissNotice => ViewState
            {   notice: None
              , ..self
            }
        }
    }

    /// Result shown on the current tab, if any
    pub fn current_outcome(&self) -> Option<Outcome>
    {   match self.tab
        {   Tab::Optimize => self.optimize_result.clone()
              .map(Outcome::Optimized)
          , Tab::Generate => self.generate_result.clone()
              .map(Outcome::Generated)
        }
    }
}

/// Styling hint for a badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tone
{   Good
  , Neutral
  , Warning
}

pub fn tokens_saved_tone(tokens_saved: i64) -> Tone
{   if tokens_saved > 0 { Tone::Good } else { Tone::Neutral }
}

pub fn confidence_tone(confidence_score: f64) -> Tone
{   if confidence_score > 0.8 { Tone::Good } else { Tone::Warning }
}

pub fn tokens_saved_badge(tokens_saved: i64) -> String
{   format!("{} tokens saved", tokens_saved)
}

/// Whole-percent badge used on optimize results
pub fn confidence_badge(confidence_score: f64) -> String
{   format!("{}% confidence", (confidence_score * 100.0).round() as i64)
}

/// One-decimal percentage used on generate results and exports.
/// Ties round up (81.25 -> 81.3).
pub fn confidence_percent_text(confidence_score: f64) -> String
{   let tenths = (confidence_score * 1000.0).round() / 10.0;
    format!("{:.1}%", tenths)
}
