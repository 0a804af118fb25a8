use std::path::PathBuf;
use tokio::sync::mpsc;
use log::{debug, trace, error, info, warn};

use crate::catalog::Catalog;
use crate::client::ApiClient;
use crate::error::Error;
use crate::validation::{AdvisoryPolicy, GenerateForm, OptimizeForm};
use crate::view::{FieldError, Outcome, Transition, ViewState};
use crate::SessionFoot;

/// Sent back to the session loop by spawned round trips
enum SessionEvent
{   /// Intermediate view change
    View(Transition)
  , /// Round trip done; apply and answer the caller
    Finished
    {   transition: Transition
      , result: Result<(), Error>
      , reply: crate::SubmitReplySender
    }
  , CatalogLoaded
    {   catalog: Catalog
      , reply: crate::LoadCatalogReplySender
    }
}

type EventSender = mpsc::UnboundedSender<SessionEvent>;

/// State owned by the session task
pub struct SessionState
{   pub view: ViewState
  , pub catalog: Option<Catalog>
  , pub in_flight: bool
  , pub client: ApiClient
}

impl SessionState
{   pub fn new(client: ApiClient) -> Self
    {   debug!("Initializing SessionState");
        SessionState
        {   view: ViewState::default()
          , catalog: None
          , in_flight: false
          , client
        }
    }

    fn apply(&mut self, transition: Transition)
    {   self.view = std::mem::take(&mut self.view).apply(transition);
    }
}

/// Public session API - owns the task
pub struct PromptSession
{   hand: crate::SessionHand
  , _task_handle: tokio::task::JoinHandle<()>
}

impl PromptSession
{   /// Create and spawn a new session
    /// Returns immediately - spawns background task
    pub fn new(client: ApiClient) -> Self
    {   debug!("Creating PromptSession with task ownership");

        let (submit_optimize_tx, submit_optimize_rx)
          = mpsc::unbounded_channel();
        let (submit_generate_tx, submit_generate_rx)
          = mpsc::unbounded_channel();
        let (load_catalog_tx, load_catalog_rx)
          = mpsc::unbounded_channel();
        let (update_view_tx, update_view_rx)
          = mpsc::unbounded_channel();
        let (export_tx, export_rx)
          = mpsc::unbounded_channel();
        let (kill_session_tx, kill_session_rx)
          = mpsc::unbounded_channel();

        let hand = crate::SessionHand
        {   submit_optimize_tx
          , submit_generate_tx
          , load_catalog_tx
          , update_view_tx
          , export_tx
          , kill_session_tx
        };

        let foot = crate::SessionFoot
        {   submit_optimize_rx
          , submit_generate_rx
          , load_catalog_rx
          , update_view_rx
          , export_rx
          , kill_session_rx
        };

        let _task_handle = tokio::spawn(async move {
          run_session_loop(foot, client).await
        });

        PromptSession
        {   hand
          , _task_handle
        }
    }

    /// Validate and submit the optimize form.
    /// The reply arrives once the round trip finishes.
    pub async fn submit_optimize(
      &self
    , form: OptimizeForm
    ) -> Result<mpsc::UnboundedReceiver<crate::SubmitReply>, Error>
    {   debug!("submit_optimize queuing command");
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();
        self.hand.submit_optimize_tx
          .send(crate::SubmitOptimizeArgs { form, reply: reply_tx })
          .map_err(|_| disconnected())?;
        Ok(reply_rx)
    }

    /// Validate and submit the generate form
    pub async fn submit_generate(
      &self
    , form: GenerateForm
    ) -> Result<mpsc::UnboundedReceiver<crate::SubmitReply>, Error>
    {   debug!("submit_generate queuing command");
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();
        self.hand.submit_generate_tx
          .send(crate::SubmitGenerateArgs { form, reply: reply_tx })
          .map_err(|_| disconnected())?;
        Ok(reply_rx)
    }

    /// Fetch the catalogs once; later calls get the cached copy
    pub async fn load_catalog(
      &self
    ) -> Result<mpsc::UnboundedReceiver<crate::LoadCatalogReply>, Error>
    {   debug!("load_catalog queuing command");
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();
        self.hand.load_catalog_tx
          .send(crate::LoadCatalogArgs { reply: reply_tx })
          .map_err(|_| disconnected())?;
        Ok(reply_rx)
    }

    /// Apply a view transition (tab switch, dismissals)
    pub async fn update_view(
      &self
    , transition: Transition
    ) -> Result<mpsc::UnboundedReceiver<crate::UpdateViewReply>, Error>
    {   self.send_view(Some(transition))
    }

    /// Read the current view state
    pub async fn view_state(
      &self
    ) -> Result<mpsc::UnboundedReceiver<crate::UpdateViewReply>, Error>
    {   self.send_view(None)
    }

    fn send_view(
      &self
    , transition: Option<Transition>
    ) -> Result<mpsc::UnboundedReceiver<crate::UpdateViewReply>, Error>
    {   trace!("update_view queuing {:?}", transition);
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();
        self.hand.update_view_tx
          .send(crate::UpdateViewArgs { transition, reply: reply_tx })
          .map_err(|_| disconnected())?;
        Ok(reply_rx)
    }

    /// Write the current generated prompt into `dir`
    pub async fn export_generated(
      &self
    , dir: PathBuf
    ) -> Result<mpsc::UnboundedReceiver<crate::ExportReply>, Error>
    {   debug!("export_generated queuing command");
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();
        self.hand.export_tx
          .send(crate::ExportArgs { dir, reply: reply_tx })
          .map_err(|_| disconnected())?;
        Ok(reply_rx)
    }

    /// Gracefully shutdown the session
    pub async fn shutdown(self) -> Result<(), Error>
    {   debug!("Shutting down PromptSession");
        let (reply_tx, mut reply_rx) = mpsc::unbounded_channel();

        self.hand.kill_session_tx
          .send(crate::KillSessionArgs { reply: reply_tx })
          .map_err(|_| {
            error!("Session channel already closed");
            Error::SessionClosed
          })?;

        match reply_rx.recv().await
        {   Some(result) => {
              debug!("Session shutdown confirmed");
              result
            }
          , None => {
              error!("Session ended without confirming shutdown");
              Err(Error::SessionClosed)
            }
        }
    }

    /// Drop the handle and hand back the task; the loop ends once
    /// its command channels close
    pub fn into_task(self) -> tokio::task::JoinHandle<()>
    {   let PromptSession { hand, _task_handle: task } = self;
        drop(hand);
        task
    }
}

fn disconnected() -> Error
{   error!("Session channel closed");
    Error::SessionClosed
}

/// Main session event loop
///
/// Round trips run in their own tasks and report back through
/// `event_rx`, so the view state has a single writer: this loop.
async fn run_session_loop(foot: SessionFoot, client: ApiClient)
{   debug!("Starting session event loop");
    let mut state = SessionState::new(client);
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let SessionFoot
    {   mut submit_optimize_rx
      , mut submit_generate_rx
      , mut load_catalog_rx
      , mut update_view_rx
      , mut export_rx
      , mut kill_session_rx
    } = foot;

    loop
    { tokio::select!
      { Some(cmd) = submit_optimize_rx.recv() => {
          debug!("Received SubmitOptimize");
          if reject_if_busy(&state, &cmd.reply)
          {   continue;
          }
          state.in_flight = true;
          tokio::spawn(run_optimize(
            state.client.clone(),
            cmd.form,
            cmd.reply,
            event_tx.clone()
          ));
        }
      , Some(cmd) = submit_generate_rx.recv() => {
          debug!("Received SubmitGenerate");
          if reject_if_busy(&state, &cmd.reply)
          {   continue;
          }
          state.in_flight = true;
          tokio::spawn(run_generate(
            state.client.clone(),
            cmd.form,
            cmd.reply,
            event_tx.clone()
          ));
        }
      , Some(cmd) = load_catalog_rx.recv() => {
          debug!("Received LoadCatalog");
          match &state.catalog
          {   Some(catalog) => {
                let _ = cmd.reply.send(Ok(catalog.clone()));
              }
            , None => {
                tokio::spawn(run_load_catalog(
                  state.client.clone(),
                  cmd.reply,
                  event_tx.clone()
                ));
              }
          }
        }
      , Some(cmd) = update_view_rx.recv() => {
          if let Some(transition) = cmd.transition
          {   state.apply(transition);
          }
          let _ = cmd.reply.send(state.view.clone());
        }
      , Some(cmd) = export_rx.recv() => {
          debug!("Received Export");
          let result = match &state.view.generate_result
          {   Some(result) => {
                crate::export::write_document(result, &cmd.dir)
              }
            , None => Err(Error::Other(
                "No generated prompt to export".to_string()
              ))
          };
          let _ = cmd.reply.send(result);
        }
      , Some(event) = event_rx.recv() => {
          match event
          {   SessionEvent::View(transition) => state.apply(transition)
            , SessionEvent::Finished { transition, result, reply } => {
                state.in_flight = false;
                state.apply(transition);
                let _ = reply.send(result.map(|_| state.view.clone()));
              }
            , SessionEvent::CatalogLoaded { catalog, reply } => {
                if state.catalog.is_none()
                {   state.catalog = Some(catalog.clone());
                }
                let _ = reply.send(Ok(catalog));
              }
          }
        }
      , cmd = kill_session_rx.recv() => {
          match cmd
          {   Some(cmd) => {
                debug!("Received KillSession");
                let _ = cmd.reply.send(Ok(()));
              }
            , None => debug!("Session handle dropped")
          }
          info!("Session shutting down");
          break;
        }
      }
    }
}

/// At most one round trip in flight per session
fn reject_if_busy(
  state: &SessionState
, reply: &crate::SubmitReplySender
) -> bool
{   if state.in_flight
    {   warn!("Submit rejected: a request is already in progress");
        let _ = reply.send(Err(Error::Other(
          "A request is already in progress".to_string()
        )));
        return true;
    }
    false
}

async fn run_optimize(
  client: ApiClient
, form: OptimizeForm
, reply: crate::SubmitReplySender
, events: EventSender
)
{   let policy = AdvisoryPolicy::from_fail_open(
      client.config().fail_open_validation
    );
    let request = match form.prepare(&client, policy).await
    {   Ok(request) => request
      , Err(e) => {
          finish_invalid(e, reply, &events);
          return;
        }
    };
    started(&events);

    let (transition, result) = match client.optimize_prompt(&request).await
    {   Ok(response) => (
          Transition::RequestSucceeded(Outcome::Optimized(response)),
          Ok(())
        )
      , Err(e) => (
          Transition::RequestFailed(e.to_string()),
          Err(Error::Transport(e))
        )
    };
    let _ = events.send(SessionEvent::Finished { transition, result, reply });
}

async fn run_generate(
  client: ApiClient
, form: GenerateForm
, reply: crate::SubmitReplySender
, events: EventSender
)
{   let request = match form.build()
    {   Ok(request) => request
      , Err(e) => {
          finish_invalid(e, reply, &events);
          return;
        }
    };
    started(&events);

    let (transition, result) = match client.generate_prompt(&request).await
    {   Ok(response) => (
          Transition::RequestSucceeded(Outcome::Generated(response)),
          Ok(())
        )
      , Err(e) => (
          Transition::RequestFailed(e.to_string()),
          Err(Error::Transport(e))
        )
    };
    let _ = events.send(SessionEvent::Finished { transition, result, reply });
}

fn finish_invalid(
  e: crate::error::ValidationError
, reply: crate::SubmitReplySender
, events: &EventSender
)
{   debug!("Submission blocked: {}", e);
    let _ = events.send(SessionEvent::Finished
    {   transition: Transition::ValidationFailed(FieldError::from(&e))
      , result: Err(Error::Validation(e))
      , reply
    });
}

fn started(events: &EventSender)
{   let _ = events.send(SessionEvent::View(Transition::ValidationPassed));
    let _ = events.send(SessionEvent::View(Transition::RequestStarted));
}

async fn run_load_catalog(
  client: ApiClient
, reply: crate::LoadCatalogReplySender
, events: EventSender
)
{   let (models, optimization_types, task_types, output_formats)
      = tokio::join!(
          client.get_models(),
          client.get_optimization_types(),
          client.get_task_types(),
          client.get_output_formats()
        );
    let (catalog, errors) = Catalog::from_results(
      models,
      optimization_types,
      task_types,
      output_formats
    );
    for e in &errors
    {   warn!("Using fallback catalog: {}", e);
    }
    let _ = events.send(SessionEvent::CatalogLoaded { catalog, reply });
}
