//! Markdown export of a generated prompt.
//!
//! The section layout is what users already feed into their own
//! tooling, so headers and their order are fixed.

use std::fs;
use std::path::{Path, PathBuf};
use log::{debug, info};

use crate::error::Error;
use crate::request::{GenerateResponse, PromptStructure};
use crate::view::confidence_percent_text;

pub const EXPORT_FILE_NAME: &str = "generated-prompt.md";

const TITLE: &str = "# Generated Prompt\n\n";
const MAIN: &str = "## Main Prompt\n";
const STRUCTURE: &str = "\n\n## Prompt Structure\n";
const TIPS: &str = "\n\n## Usage Tips\n";
const ALTERNATIVES: &str = "\n\n## Alternative Prompts\n";
const METADATA: &str = "\n\n## Metadata\n";

/// Render the downloadable document
pub fn render_document(result: &GenerateResponse) -> String
{   let structure = result.prompt_structure.entries()
      .iter()
      .map(|(label, value)| format!("- **{}**: {}", label, value))
      .collect::<Vec<_>>()
      .join("\n");
    let tips = result.usage_tips
      .iter()
      .map(|tip| format!("- {}", tip))
      .collect::<Vec<_>>()
      .join("\n");
    let alternatives = result.alternatives
      .iter()
      .enumerate()
      .map(|(i, alt)| format!("### Alternative {}\n{}", i + 1, alt))
      .collect::<Vec<_>>()
      .join("\n\n");

    let mut document = String::new();
    document.push_str(TITLE);
    document.push_str(MAIN);
    document.push_str(&result.generated_prompt);
    document.push_str(STRUCTURE);
    document.push_str(&structure);
    document.push_str(TIPS);
    document.push_str(&tips);
    document.push_str(ALTERNATIVES);
    document.push_str(&alternatives);
    document.push_str(METADATA);
    document.push_str(&format!(
      "- Model: {}\n- Confidence Score: {}",
      result.model_used,
      confidence_percent_text(result.confidence_score)
    ));
    document.trim().to_string()
}

/// Write the document into `dir` under [`EXPORT_FILE_NAME`]
pub fn write_document(
  result: &GenerateResponse
, dir: &Path
) -> Result<PathBuf, Error>
{   let path = dir.join(EXPORT_FILE_NAME);
    fs::write(&path, render_document(result))?;
    info!("Exported generated prompt to {}", path.display());
    Ok(path)
}

/// Sections read back from an exported document
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedPrompt
{   pub generated_prompt: String
  , pub prompt_structure: PromptStructure
  , pub usage_tips: Vec<String>
  , pub alternatives: Vec<String>
  , pub model_used: String
  , /// Already multiplied by 100, one decimal of precision
    pub confidence_percent: f64
}

/// Parse a document produced by [`render_document`]
pub fn parse_document(document: &str) -> Result<ExportedPrompt, Error>
{   let mut cursor = Cursor { rest: document };
    cursor.expect(TITLE)?;
    cursor.expect(MAIN)?;
    let generated_prompt = cursor.take_until(STRUCTURE)?;

    let context = field_value(&mut cursor, "Context")?;
    let objectives = field_value(&mut cursor, "Objectives")?;
    let action = field_value(&mut cursor, "Action")?;
    let support = field_value(&mut cursor, "Support")?;
    let technology = field_value(&mut cursor, "Technology")?;

    cursor.expect(TIPS)?;
    let tips_body = cursor.take_until(ALTERNATIVES)?;
    let usage_tips = parse_tips(tips_body);

    let alternatives_body = cursor.take_until(METADATA)?;
    let alternatives = parse_alternatives(alternatives_body)?;

    cursor.expect("- Model: ")?;
    let model_used = cursor.take_until("\n- Confidence Score: ")?;
    let confidence_percent = cursor.rest
      .trim_end_matches('%')
      .parse::<f64>()
      .map_err(|e| Error::ParseError(format!("confidence score: {}", e)))?;

    debug!(
      "Parsed export with {} tip(s), {} alternative(s)",
      usage_tips.len(),
      alternatives.len()
    );
    Ok(ExportedPrompt
    {   generated_prompt: generated_prompt.to_string()
      , prompt_structure: PromptStructure
        {   context
          , objectives
          , action
          , support
          , technology
        }
      , usage_tips
      , alternatives
      , model_used: model_used.to_string()
      , confidence_percent
    })
}

struct Cursor<'a>
{   rest: &'a str
}

impl<'a> Cursor<'a>
{   fn expect(&mut self, marker: &str) -> Result<(), Error>
    {   self.rest = self.rest.strip_prefix(marker).ok_or_else(|| {
          Error::ParseError(format!("expected {:?}", marker.trim()))
        })?;
        Ok(())
    }

    /// Text before the first `marker`; the cursor moves past it
    fn take_until(&mut self, marker: &str) -> Result<&'a str, Error>
    {   let idx = self.rest.find(marker).ok_or_else(|| {
          Error::ParseError(format!("missing section {:?}", marker.trim()))
        })?;
        let (before, after) = self.rest.split_at(idx);
        self.rest = &after[marker.len()..];
        Ok(before)
    }
}

fn field_value(cursor: &mut Cursor<'_>, label: &str)
  -> Result<String, Error>
{   cursor.expect(&format!("- **{}**: ", label))?;
    let end = match next_label(label)
    {   Some(next) => format!("\n- **{}**: ", next)
      , None => TIPS.to_string()
    };
    let idx = cursor.rest.find(&end).ok_or_else(|| {
      Error::ParseError(format!("missing {:?}", end.trim()))
    })?;
    let (value, rest) = cursor.rest.split_at(idx);
    // the next field starts right after the newline
    cursor.rest = if end == TIPS { rest } else { &rest[1..] };
    Ok(value.to_string())
}

fn next_label(label: &str) -> Option<&'static str>
{   match label
    {   "Context" => Some("Objectives")
      , "Objectives" => Some("Action")
      , "Action" => Some("Support")
      , "Support" => Some("Technology")
      , _ => None
    }
}

/// One tip per top-level bullet. Tips are not escaped when rendered,
/// so a tip holding its own "- " lines reads back as several tips.
fn parse_tips(body: &str) -> Vec<String>
{   if body.is_empty()
    {   return Vec::new();
    }
    body.strip_prefix("- ")
      .unwrap_or(body)
      .split("\n- ")
      .map(str::to_string)
      .collect()
}

fn parse_alternatives(body: &str) -> Result<Vec<String>, Error>
{   let mut alternatives = Vec::new();
    if body.is_empty()
    {   return Ok(alternatives);
    }
    let mut cursor = Cursor { rest: body };
    let mut index = 1;
    cursor.expect(&format!("### Alternative {}\n", index))?;
    loop
    {   let next = format!("\n\n### Alternative {}\n", index + 1);
        match cursor.rest.find(&next)
        {   Some(idx) => {
              alternatives.push(cursor.rest[..idx].to_string());
              cursor.rest = &cursor.rest[idx + next.len()..];
              index += 1;
            }
          , None => {
              alternatives.push(cursor.rest.to_string());
              break;
            }
        }
    }
    Ok(alternatives)
}
