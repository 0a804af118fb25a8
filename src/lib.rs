pub mod error;
pub mod config;
pub mod request;
pub mod catalog;
pub mod validation;
pub mod client;
pub mod view;
pub mod export;
pub mod session;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::Error;
pub use session::PromptSession;

/*

prompt-optimizer: async client for the prompt-optimizer backend.
Two workflows share one shape: optimize an existing prompt, or
generate a new one from requirements. The LLM work happens behind
the backend; this crate owns the data contracts, the pre-flight
checks, the error wording and the view state.

prompt-optimizer/
├── src/
│   ├── lib.rs          # Re-exports and the session interface
│   ├── error.rs        # Transport/validation errors, message table
│   ├── config.rs       # Client config and form defaults
│   ├── request.rs      # Request/response records
│   ├── catalog.rs      # Models, goals, task types, output formats
│   ├── validation.rs   # Forms, pre-flight checks, request building
│   ├── client.rs       # HTTP transport, one method per endpoint
│   ├── view.rs         # View state and its transitions
│   ├── export.rs       # Markdown export of generated prompts
│   ├── session.rs      # Session task driving both workflows
│   └── main.rs         # CLI
└── tests/              # Integration tests against a fake backend

*/

/// SESSION API INTERFACE:

// ===== SubmitOptimize =====

pub type SubmitReply
  = Result<crate::view::ViewState, crate::error::Error>;
pub type SubmitReplySender
  = tokio::sync::mpsc::UnboundedSender<SubmitReply>;

pub struct SubmitOptimizeArgs
{   pub form: crate::validation::OptimizeForm
  , pub reply: SubmitReplySender
}

// ===== SubmitGenerate =====

pub struct SubmitGenerateArgs
{   pub form: crate::validation::GenerateForm
  , pub reply: SubmitReplySender
}

// ===== LoadCatalog =====

pub type LoadCatalogReply
  = Result<crate::catalog::Catalog, crate::error::Error>;
pub type LoadCatalogReplySender
  = tokio::sync::mpsc::UnboundedSender<LoadCatalogReply>;

pub struct LoadCatalogArgs
{   pub reply: LoadCatalogReplySender
}

// ===== UpdateView =====

pub type UpdateViewReply = crate::view::ViewState;
pub type UpdateViewReplySender
  = tokio::sync::mpsc::UnboundedSender<UpdateViewReply>;

/// `transition: None` only reads the current state
pub struct UpdateViewArgs
{   pub transition: Option<crate::view::Transition>
  , pub reply: UpdateViewReplySender
}

// ===== ExportGenerated =====

pub type ExportReply
  = Result<std::path::PathBuf, crate::error::Error>;
pub type ExportReplySender
  = tokio::sync::mpsc::UnboundedSender<ExportReply>;

pub struct ExportArgs
{   pub dir: std::path::PathBuf
  , pub reply: ExportReplySender
}

// ===== KillSession =====

pub type KillSessionReply = Result<(), crate::error::Error>;
pub type KillSessionReplySender
  = tokio::sync::mpsc::UnboundedSender<KillSessionReply>;

pub struct KillSessionArgs
{   pub reply: KillSessionReplySender
}

// ===== SessionHand (sender side) =====

pub struct SessionHand
{   pub submit_optimize_tx
      : tokio::sync::mpsc::UnboundedSender<SubmitOptimizeArgs>
  , pub submit_generate_tx
      : tokio::sync::mpsc::UnboundedSender<SubmitGenerateArgs>
  , pub load_catalog_tx
      : tokio::sync::mpsc::UnboundedSender<LoadCatalogArgs>
  , pub update_view_tx
      : tokio::sync::mpsc::UnboundedSender<UpdateViewArgs>
  , pub export_tx
      : tokio::sync::mpsc::UnboundedSender<ExportArgs>
  , pub kill_session_tx
      : tokio::sync::mpsc::UnboundedSender<KillSessionArgs>
}

// ===== SessionFoot (receiver side) =====

pub struct SessionFoot
{   pub submit_optimize_rx
      : tokio::sync::mpsc::UnboundedReceiver<SubmitOptimizeArgs>
  , pub submit_generate_rx
      : tokio::sync::mpsc::UnboundedReceiver<SubmitGenerateArgs>
  , pub load_catalog_rx
      : tokio::sync::mpsc::UnboundedReceiver<LoadCatalogArgs>
  , pub update_view_rx
      : tokio::sync::mpsc::UnboundedReceiver<UpdateViewArgs>
  , pub export_rx
      : tokio::sync::mpsc::UnboundedReceiver<ExportArgs>
  , pub kill_session_rx
      : tokio::sync::mpsc::UnboundedReceiver<KillSessionArgs>
}
