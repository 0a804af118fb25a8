//! Request and response records exchanged with the backend

use serde::{Deserialize, Serialize};
use std::fmt;

/// Body of `POST /optimize`
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizeRequest
{   /// The prompt to optimize
    pub prompt: String
  , /// Model identifier
    pub model: String
  , /// Extra context for the optimizer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>
  , /// Server-defined goal (general, clarity, ...)
    pub optimization_goal: String
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>
  , /// Overrides the server's LLM key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>
  , /// Overrides the server's LLM endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>
}

impl fmt::Debug for OptimizeRequest
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   f.debug_struct("OptimizeRequest")
          .field("prompt_chars", &self.prompt.chars().count())
          .field("model", &self.model)
          .field("context", &self.context.is_some())
          .field("optimization_goal", &self.optimization_goal)
          .field("max_tokens", &self.max_tokens)
          .field("api_key", &self.api_key.as_ref().map(|_| "<set>"))
          .field("base_url", &self.base_url)
          .finish()
    }
}

/// Result of an optimize call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizeResponse
{   pub original_prompt: String
  , pub optimized_prompt: String
  , pub suggestions: Vec<String>
  , pub reasoning: String
  , pub model_used: String
  , /// Negative when the prompt grew
    #[serde(default)]
    pub tokens_saved: i64
  , /// Fraction in [0, 1]
    #[serde(default)]
    pub confidence_score: f64
}

impl OptimizeResponse
{   pub fn confidence_percent(&self) -> f64
    {   self.confidence_score * 100.0
    }
}

/// Body of `POST /generate`
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest
{   /// What the generated prompt should achieve
    pub requirements: String
  , pub task_type: String
  , pub output_format: String
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub constraints: Option<String>
  , /// Never `Some(vec![])`; blanks are dropped when building
    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<String>>
  , pub model: String
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>
}

impl fmt::Debug for GenerateRequest
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   f.debug_struct("GenerateRequest")
          .field("requirements_chars", &self.requirements.chars().count())
          .field("task_type", &self.task_type)
          .field("output_format", &self.output_format)
          .field("context", &self.context.is_some())
          .field("constraints", &self.constraints.is_some())
          .field(
            "examples",
            &self.examples.as_ref().map(|e| e.len())
          )
          .field("model", &self.model)
          .field("max_tokens", &self.max_tokens)
          .field("api_key", &self.api_key.as_ref().map(|_| "<set>"))
          .field("base_url", &self.base_url)
          .finish()
    }
}

/// The five COAST components of a generated prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptStructure
{   pub context: String
  , pub objectives: String
  , pub action: String
  , pub support: String
  , pub technology: String
}

impl PromptStructure
{   /// Display labels paired with values, in COAST order
    pub fn entries(&self) -> [(&'static str, &str); 5]
    {   [ ("Context", self.context.as_str())
        , ("Objectives", self.objectives.as_str())
        , ("Action", self.action.as_str())
        , ("Support", self.support.as_str())
        , ("Technology", self.technology.as_str())
        ]
    }
}

/// Result of a generate call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse
{   pub generated_prompt: String
  , pub prompt_structure: PromptStructure
  , pub usage_tips: Vec<String>
  , pub alternatives: Vec<String>
  , pub model_used: String
  , #[serde(default)]
    pub confidence_score: f64
}

impl GenerateResponse
{   pub fn confidence_percent(&self) -> f64
    {   self.confidence_score * 100.0
    }
}

/// Body of `POST /validate`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateBody
{   pub prompt: String
}

/// Result of the advisory pre-flight check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult
{   pub is_valid: bool
  , #[serde(default)]
    pub issues: Vec<String>
  , #[serde(default)]
    pub suggestions: Vec<String>
}

/// Reply of `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus
{   pub status: String
  , pub service: String
}

/// Error body shape; `detail` may be text or structured
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody
{   #[serde(default)]
    pub detail: Option<serde_json::Value>
}

impl ErrorBody
{   /// Detail as display text; structured details become compact JSON
    pub fn detail_text(&self) -> Option<String>
    {   match &self.detail
        {   None | Some(serde_json::Value::Null) => None
          , Some(serde_json::Value::String(s)) if s.is_empty() => None
          , Some(serde_json::Value::String(s)) => Some(s.clone())
          , Some(other) => Some(other.to_string())
        }
    }
}

#[cfg(test)]
mod tests
{   use super::*;
    use serde_json::json;

    fn bare_optimize() -> OptimizeRequest
    {   OptimizeRequest
        {   prompt: "Summarize this article".to_string()
          , model: "gpt-4.1".to_string()
          , context: None
          , optimization_goal: "general".to_string()
          , max_tokens: None
          , api_key: None
          , base_url: None
        }
    }

    #[test]
    fn absent_optionals_are_not_serialized()
    {   let value = serde_json::to_value(bare_optimize()).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 3);
        assert!(!obj.contains_key("context"));
        assert!(!obj.contains_key("api_key"));
        assert!(!obj.contains_key("max_tokens"));
    }

    #[test]
    fn debug_never_prints_the_key()
    {   let mut req = bare_optimize();
        req.api_key = Some("sk-very-secret".to_string());
        let printed = format!("{:?}", req);
        assert!(!printed.contains("sk-very-secret"));
        assert!(printed.contains("<set>"));
    }

    #[test]
    fn optimize_response_defaults_scores()
    {   let resp: OptimizeResponse = serde_json::from_value(json!({
          "original_prompt": "a",
          "optimized_prompt": "b",
          "suggestions": ["one", "two"],
          "reasoning": "r",
          "model_used": "gpt-4o"
        })).unwrap();
        assert_eq!(resp.tokens_saved, 0);
        assert_eq!(resp.confidence_score, 0.0);
        assert_eq!(resp.suggestions, vec!["one", "two"]);
    }

    #[test]
    fn negative_tokens_saved_is_kept()
    {   let resp: OptimizeResponse = serde_json::from_value(json!({
          "original_prompt": "a",
          "optimized_prompt": "a longer prompt",
          "suggestions": [],
          "reasoning": "",
          "model_used": "gpt-4o",
          "tokens_saved": -12,
          "confidence_score": 0.85
        })).unwrap();
        assert_eq!(resp.tokens_saved, -12);
        assert!((resp.confidence_percent() - 85.0).abs() < 1e-9);
    }

    #[test]
    fn prompt_structure_requires_all_five_keys()
    {   let missing = serde_json::from_value::<PromptStructure>(json!({
          "context": "c", "objectives": "o", "action": "a",
          "support": "s"
        }));
        assert!(missing.is_err());
    }

    #[test]
    fn error_body_detail_text()
    {   let text: ErrorBody = serde_json::from_value(
          json!({ "detail": "Model not found" })
        ).unwrap();
        assert_eq!(text.detail_text().as_deref(), Some("Model not found"));

        let structured: ErrorBody = serde_json::from_value(
          json!({ "detail": [{ "loc": ["body", "prompt"] }] })
        ).unwrap();
        assert_eq!(
          structured.detail_text().as_deref(),
          Some(r#"[{"loc":["body","prompt"]}]"#)
        );

        let empty: ErrorBody = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty.detail_text(), None);

        let blank: ErrorBody =
          serde_json::from_value(json!({ "detail": "" })).unwrap();
        assert_eq!(blank.detail_text(), None);
    }
}
