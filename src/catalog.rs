//! Reference data used to populate selection controls.
//!
//! Fetched once per session and treated as an immutable lookup
//! table afterwards. When a fetch fails the built-in fallback list
//! for that catalog is used instead.

use serde::{Deserialize, Serialize};
use log::debug;

/// Common shape of every catalog entry: an identifier plus a
/// human-readable description
pub trait CatalogEntry
{   fn id(&self) -> &str;
    fn description(&self) -> &str;

    /// "Id - description", with the first letter of the id upper-cased
    fn label(&self) -> String
    {   format!("{} - {}", capitalize(self.id()), self.description())
    }
}

/// Per-1k-token pricing in USD
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pricing
{   pub input: f64
  , pub output: f64
}

/// A model offered by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo
{   pub model_name: String
  , pub description: String
  , pub max_tokens: u32
  , pub pricing_per_1k_tokens: Pricing
}

impl CatalogEntry for ModelInfo
{   fn id(&self) -> &str { &self.model_name }
    fn description(&self) -> &str { &self.description }

    // model names are shown verbatim
    fn label(&self) -> String
    {   format!("{} - {}", self.model_name, self.description)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizationType
{   #[serde(rename = "type")]
    pub name: String
  , pub description: String
}

impl CatalogEntry for OptimizationType
{   fn id(&self) -> &str { &self.name }
    fn description(&self) -> &str { &self.description }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskType
{   #[serde(rename = "type")]
    pub name: String
  , pub description: String
}

impl CatalogEntry for TaskType
{   fn id(&self) -> &str { &self.name }
    fn description(&self) -> &str { &self.description }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputFormat
{   pub format: String
  , pub description: String
}

impl CatalogEntry for OutputFormat
{   fn id(&self) -> &str { &self.format }
    fn description(&self) -> &str { &self.description }
}

/// `{ "types": [...] }` envelope
#[derive(Debug, Clone, Deserialize)]
pub struct TypesEnvelope<T>
{   pub types: Vec<T>
}

/// `{ "formats": [...] }` envelope
#[derive(Debug, Clone, Deserialize)]
pub struct FormatsEnvelope
{   pub formats: Vec<OutputFormat>
}

/// All four catalogs for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog
{   pub models: Vec<ModelInfo>
  , pub optimization_types: Vec<OptimizationType>
  , pub task_types: Vec<TaskType>
  , pub output_formats: Vec<OutputFormat>
}

impl Default for Catalog
{   fn default() -> Self
    {   Catalog::fallback()
    }
}

impl Catalog
{   /// Built-in lists used when the backend cannot be reached
    pub fn fallback() -> Self
    {   Catalog
        {   models: fallback_models()
          , optimization_types: fallback_optimization_types()
          , task_types: fallback_task_types()
          , output_formats: fallback_output_formats()
        }
    }

    /// Assemble from individual fetch results; each failed fetch
    /// falls back on its own
    pub fn from_results<E: std::fmt::Display>(
      models: Result<Vec<ModelInfo>, E>
    , optimization_types: Result<Vec<OptimizationType>, E>
    , task_types: Result<Vec<TaskType>, E>
    , output_formats: Result<Vec<OutputFormat>, E>
    ) -> (Self, Vec<String>)
    {   let mut errors = Vec::new();
        let catalog = Catalog
        {   models: or_fallback(models, fallback_models, &mut errors)
          , optimization_types: or_fallback(
              optimization_types,
              fallback_optimization_types,
              &mut errors
            )
          , task_types: or_fallback(
              task_types,
              fallback_task_types,
              &mut errors
            )
          , output_formats: or_fallback(
              output_formats,
              fallback_output_formats,
              &mut errors
            )
        };
        debug!(
          "Catalog assembled with {} fallback(s)",
          errors.len()
        );
        (catalog, errors)
    }

    pub fn find_model(&self, name: &str) -> Option<&ModelInfo>
    {   self.models.iter().find(|m| m.model_name == name)
    }

    pub fn has_optimization_type(&self, name: &str) -> bool
    {   self.optimization_types.iter().any(|t| t.name == name)
    }

    pub fn has_task_type(&self, name: &str) -> bool
    {   self.task_types.iter().any(|t| t.name == name)
    }

    pub fn has_output_format(&self, format: &str) -> bool
    {   self.output_formats.iter().any(|f| f.format == format)
    }
}

fn or_fallback<T, E: std::fmt::Display>(
  result: Result<Vec<T>, E>
, fallback: fn() -> Vec<T>
, errors: &mut Vec<String>
) -> Vec<T>
{   match result
    {   Ok(list) => list
      , Err(e) => {
          errors.push(e.to_string());
          fallback()
        }
    }
}

fn capitalize(s: &str) -> String
{   let mut chars = s.chars();
    match chars.next()
    {   Some(first) => first.to_uppercase().chain(chars).collect()
      , None => String::new()
    }
}

fn model(name: &str, description: &str) -> ModelInfo
{   ModelInfo
    {   model_name: name.to_string()
      , description: description.to_string()
      , max_tokens: 8192
      , pricing_per_1k_tokens: Pricing { input: 0.03, output: 0.06 }
    }
}

pub fn fallback_models() -> Vec<ModelInfo>
{   vec![
      model("gpt-4.1",
        "Latest GPT-4.1 model with enhanced capabilities")
    , model("gpt-4o", "GPT-4 Omni - multimodal capabilities")
    , model("gpt-4.1-mini",
        "GPT-4.1 Mini - cost-effective GPT-4.1 variant")
    , model("gpt-4o-mini", "GPT-4 Omni Mini - fast and cost-effective")
    ]
}

pub fn fallback_optimization_types() -> Vec<OptimizationType>
{   [ ("general", "General optimization for clarity and effectiveness")
    , ("clarity", "Focus on making the prompt clearer")
    , ("conciseness", "Make the prompt more concise")
    , ("creativity", "Enhance creativity and innovation")
    , ("specificity", "Make the prompt more specific and detailed")
    ]
    .iter()
    .map(|(name, description)| OptimizationType
    {   name: name.to_string()
      , description: description.to_string()
    })
    .collect()
}

pub fn fallback_task_types() -> Vec<TaskType>
{   [ ("general", "General-purpose prompts for various tasks")
    , ("creative",
        "Prompts for creative writing, brainstorming, and innovation")
    , ("technical",
        "Prompts for technical tasks, coding, and problem-solving")
    , ("analytical",
        "Prompts for data analysis, research, and critical thinking")
    , ("educational",
        "Prompts for teaching, learning, and knowledge sharing")
    ]
    .iter()
    .map(|(name, description)| TaskType
    {   name: name.to_string()
      , description: description.to_string()
    })
    .collect()
}

pub fn fallback_output_formats() -> Vec<OutputFormat>
{   [ ("text", "Free-form text response")
    , ("json", "Structured JSON format")
    , ("list", "Numbered or bulleted list")
    , ("structured", "Specific structured format with sections")
    ]
    .iter()
    .map(|(format, description)| OutputFormat
    {   format: format.to_string()
      , description: description.to_string()
    })
    .collect()
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn type_entries_use_the_wire_key()
    {   let parsed: TypesEnvelope<TaskType> = serde_json::from_str(
          r#"{"types":[{"type":"creative","description":"Stories"}]}"#
        ).unwrap();
        assert_eq!(parsed.types[0].name, "creative");
        assert_eq!(parsed.types[0].label(), "Creative - Stories");
    }

    #[test]
    fn model_labels_keep_the_name()
    {   let models = fallback_models();
        assert_eq!(models.len(), 4);
        assert_eq!(
          models[0].label(),
          "gpt-4.1 - Latest GPT-4.1 model with enhanced capabilities"
        );
    }

    #[test]
    fn failed_fetches_fall_back_individually()
    {   let fetched = vec![OutputFormat
        {   format: "yaml".to_string()
          , description: "YAML".to_string()
        }];
        let (catalog, errors) = Catalog::from_results::<String>(
          Err("Failed to fetch models: boom".to_string())
        , Ok(vec![])
        , Err("Failed to fetch task types: boom".to_string())
        , Ok(fetched)
        );
        assert_eq!(errors.len(), 2);
        assert_eq!(catalog.models, fallback_models());
        assert!(catalog.optimization_types.is_empty());
        assert!(catalog.has_task_type("analytical"));
        assert!(catalog.has_output_format("yaml"));
        assert!(!catalog.has_output_format("text"));
    }

    #[test]
    fn lookup_by_model_name()
    {   let catalog = Catalog::fallback();
        assert!(catalog.find_model("gpt-4o-mini").is_some());
        assert!(catalog.find_model("gpt-2").is_none());
        assert!(catalog.has_optimization_type("clarity"));
    }
}
