//! prompt-optimizer CLI
//!
//! The backend address comes from PROMPT_OPTIMIZER_API_URL unless a
//! config file is given. RUST_LOG overrides the log filter; without it
//! `--verbose` (or `verbose` in the config) switches to debug output.

use std::path::PathBuf;
use clap::{Args, Parser, Subcommand};
use log::{debug, info};

use prompt_optimizer::catalog::CatalogEntry;
use prompt_optimizer::request::{GenerateResponse, OptimizeResponse};
use prompt_optimizer::validation::{GenerateForm, OptimizeForm};
use prompt_optimizer::view::
{ confidence_badge, confidence_percent_text, tokens_saved_badge
};
use prompt_optimizer::{ApiClient, ClientConfig, Error, PromptSession};

#[derive(Debug, Parser)]
#[command(
  name = "prompt-optimizer",
  version,
  about = "Client for the prompt-optimizer backend"
)]
struct Cli
{   /// JSON config file; environment variables are used otherwise
    #[arg(long, global = true)]
    config: Option<String>
  , /// Debug logging when RUST_LOG is unset
    #[arg(short, long, global = true)]
    verbose: bool
  , #[command(subcommand)]
    command: Command
}

#[derive(Debug, Subcommand)]
enum Command
{   /// Check that the backend is up
    Health
  , /// List the models the backend offers
    Models
  , /// Show every selection catalog, with fallbacks for failed fetches
    Catalog
  , /// Optimize an existing prompt
    Optimize(OptimizeArgs)
  , /// Generate a prompt from requirements
    Generate(GenerateArgs)
}

/// Shared LLM overrides
#[derive(Debug, Args)]
struct LlmArgs
{   #[arg(long)]
    max_tokens: Option<u32>
  , #[arg(long)]
    api_key: Option<String>
  , /// Upstream LLM base URL
    #[arg(long)]
    llm_url: Option<String>
}

#[derive(Debug, Args)]
struct OptimizeArgs
{   prompt: String
  , /// Model name; any value is sent as a custom model
    #[arg(long)]
    model: Option<String>
  , /// Optimization goal, e.g. clarity or specificity
    #[arg(long)]
    goal: Option<String>
  , #[arg(long)]
    context: Option<String>
  , #[command(flatten)]
    llm: LlmArgs
}

#[derive(Debug, Args)]
struct GenerateArgs
{   requirements: String
  , #[arg(long)]
    model: Option<String>
  , #[arg(long)]
    task_type: Option<String>
  , /// Output format, e.g. text, json, markdown
    #[arg(long)]
    format: Option<String>
  , #[arg(long)]
    context: Option<String>
  , #[arg(long)]
    constraints: Option<String>
  , /// Example output; repeat for more than one
    #[arg(long = "example")]
    examples: Vec<String>
  , /// Write generated-prompt.md into this directory
    #[arg(long)]
    export: Option<PathBuf>
  , #[command(flatten)]
    llm: LlmArgs
}

#[tokio::main]
async fn main()
{   let cli = Cli::parse();
    if let Err(e) = run(cli).await
    {   eprintln!("{}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Error>
{   let mut config = match &cli.config
    {   Some(path) => ClientConfig::from_file(path)?
      , None => ClientConfig::from_env()?
    };
    config.verbose |= cli.verbose;
    env_logger::Builder::from_env(
      env_logger::Env::default()
        .default_filter_or(config.default_log_filter())
    ).init();

    info!("Using backend at {}", config.api_base());
    let client = ApiClient::new(config)?;

    match cli.command
    {   Command::Health => {
          let health = client.health_check().await?;
          println!("{}: {}", health.service, health.status);
          Ok(())
        }
      , Command::Models => {
          for model in client.get_models().await?
          {   println!(
                "{} (max {} tokens, ${}/${} per 1k in/out)",
                model.label(),
                model.max_tokens,
                model.pricing_per_1k_tokens.input,
                model.pricing_per_1k_tokens.output
              );
          }
          Ok(())
        }
      , Command::Catalog => print_catalog(client).await
      , Command::Optimize(args) => optimize(client, args).await
      , Command::Generate(args) => generate(client, args).await
    }
}

async fn print_catalog(client: ApiClient) -> Result<(), Error>
{   let session = PromptSession::new(client);
    let mut rx = session.load_catalog().await?;
    let catalog = rx.recv().await.ok_or(Error::SessionClosed)??;

    println!("Models:");
    for model in &catalog.models
    {   println!("  {}", model.label());
    }
    println!("Optimization goals:");
    for goal in &catalog.optimization_types
    {   println!("  {}", goal.label());
    }
    println!("Task types:");
    for task in &catalog.task_types
    {   println!("  {}", task.label());
    }
    println!("Output formats:");
    for format in &catalog.output_formats
    {   println!("  {}", format.label());
    }
    session.shutdown().await
}

async fn optimize(client: ApiClient, args: OptimizeArgs) -> Result<(), Error>
{   let mut form = OptimizeForm::default();
    form.prompt = args.prompt;
    if let Some(model) = args.model
    {   form.use_custom_model = true;
        form.custom_model = model;
    }
    if let Some(goal) = args.goal
    {   form.optimization_goal = goal;
    }
    form.context = args.context.unwrap_or_default();
    if let Some(max_tokens) = args.llm.max_tokens
    {   form.max_tokens = max_tokens.to_string();
    }
    form.api_key = args.llm.api_key.unwrap_or_default();
    if let Some(url) = args.llm.llm_url
    {   form.base_url = url;
    }
    debug!(
      "Optimize form: {} chars, {} words",
      form.char_count(),
      form.word_count()
    );

    let session = PromptSession::new(client);
    let mut rx = session.submit_optimize(form).await?;
    let state = rx.recv().await.ok_or(Error::SessionClosed)??;
    if let Some(result) = &state.optimize_result
    {   print_optimized(result);
    }
    session.shutdown().await
}

async fn generate(client: ApiClient, args: GenerateArgs) -> Result<(), Error>
{   let mut form = GenerateForm::default();
    form.requirements = args.requirements;
    if let Some(model) = args.model
    {   form.model = model;
    }
    if let Some(task_type) = args.task_type
    {   form.task_type = task_type;
    }
    if let Some(format) = args.format
    {   form.output_format = format;
    }
    form.context = args.context.unwrap_or_default();
    form.constraints = args.constraints.unwrap_or_default();
    if let Some(max_tokens) = args.llm.max_tokens
    {   form.max_tokens = max_tokens.to_string();
    }
    form.api_key = args.llm.api_key.unwrap_or_default();
    form.base_url = args.llm.llm_url.unwrap_or_default();
    if !args.examples.is_empty()
    {   form.examples = args.examples;
    }

    let session = PromptSession::new(client);
    let mut rx = session.submit_generate(form).await?;
    let state = rx.recv().await.ok_or(Error::SessionClosed)??;
    if let Some(result) = &state.generate_result
    {   print_generated(result);
    }

    if let Some(dir) = args.export
    {   let mut rx = session.export_generated(dir).await?;
        let path = rx.recv().await.ok_or(Error::SessionClosed)??;
        println!("\nSaved to {}", path.display());
    }
    session.shutdown().await
}

fn print_optimized(result: &OptimizeResponse)
{   println!("Optimized prompt:\n{}\n", result.optimized_prompt);
    println!(
      "{} | {} | model: {}",
      tokens_saved_badge(result.tokens_saved),
      confidence_badge(result.confidence_score),
      result.model_used
    );
    if !result.reasoning.is_empty()
    {   println!("\nReasoning:\n{}", result.reasoning);
    }
    if !result.suggestions.is_empty()
    {   println!("\nSuggestions:");
        for suggestion in &result.suggestions
        {   println!("  - {}", suggestion);
        }
    }
}

fn print_generated(result: &GenerateResponse)
{   println!(
      "Model: {} | Confidence: {}\n",
      result.model_used,
      confidence_percent_text(result.confidence_score)
    );
    println!("{}\n", result.generated_prompt);
    println!("Prompt structure (COAST):");
    for (label, value) in result.prompt_structure.entries()
    {   println!("  {}: {}", label, value);
    }
    if !result.usage_tips.is_empty()
    {   println!("\nUsage tips:");
        for tip in &result.usage_tips
        {   println!("  - {}", tip);
        }
    }
    for (i, alternative) in result.alternatives.iter().enumerate()
    {   println!("\nAlternative {}:\n{}", i + 1, alternative);
    }
}

#[cfg(test)]
mod tests
{   use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent()
    {   Cli::command().debug_assert();
    }

    #[test]
    fn misspelled_options_are_errors()
    {   let parsed = Cli::try_parse_from([
          "prompt-optimizer", "optimize", "Explain lifetimes",
          "--modle", "gpt-4o"
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn export_belongs_to_generate_only()
    {   let parsed = Cli::try_parse_from([
          "prompt-optimizer", "optimize", "Explain lifetimes",
          "--export", "out"
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn generate_collects_repeated_examples()
    {   let cli = Cli::try_parse_from([
          "prompt-optimizer", "--verbose", "generate", "Review PRs",
          "--example", "first", "--example", "second",
          "--max-tokens", "500", "--export", "out"
        ]).unwrap();
        assert!(cli.verbose);
        match cli.command
        {   Command::Generate(args) => {
              assert_eq!(args.requirements, "Review PRs");
              assert_eq!(args.examples, vec!["first", "second"]);
              assert_eq!(args.llm.max_tokens, Some(500));
              assert_eq!(args.export, Some(PathBuf::from("out")));
            }
          , other => panic!("unexpected command {:?}", other)
        }
    }

    #[test]
    fn non_numeric_max_tokens_is_an_error()
    {   let parsed = Cli::try_parse_from([
          "prompt-optimizer", "optimize", "Explain lifetimes",
          "--max-tokens", "lots"
        ]);
        assert!(parsed.is_err());
    }
}
