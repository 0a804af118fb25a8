//! In-process fake backend for integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use axum::Router;
use serde_json::{json, Value};

use prompt_optimizer::{ApiClient, ClientConfig};

/// Bind `router` on a random local port and serve it in the background
pub async fn spawn_backend(router: Router) -> String
{   let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
      .await
      .expect("bind fake backend");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
      axum::serve(listener, router).await.expect("serve fake backend");
    });
    format!("http://{}", addr)
}

/// Base URL of a port nothing listens on
pub async fn dead_backend() -> String
{   let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
      .await
      .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{}", addr)
}

pub fn client_for(base_url: &str) -> ApiClient
{   ApiClient::new(ClientConfig::with_base_url(base_url))
      .expect("valid config")
}

/// Client whose calls all time out after one second
pub fn impatient_client_for(base_url: &str) -> ApiClient
{   let config = ClientConfig
    {   request_timeout_secs: 1
      , catalog_timeout_secs: 1
      , ..ClientConfig::with_base_url(base_url)
    };
    ApiClient::new(config).expect("valid config")
}

/// Records request bodies and counts hits per endpoint
#[derive(Clone, Default)]
pub struct Recorder
{   bodies: Arc<Mutex<Vec<(String, Value)>>>
  , hits: Arc<AtomicUsize>
}

impl Recorder
{   pub fn record(&self, path: &str, body: Value)
    {   self.hits.fetch_add(1, Ordering::SeqCst);
        self.bodies.lock().unwrap().push((path.to_string(), body));
    }

    pub fn hits(&self) -> usize
    {   self.hits.load(Ordering::SeqCst)
    }

    pub fn bodies_for(&self, path: &str) -> Vec<Value>
    {   self.bodies.lock().unwrap()
          .iter()
          .filter(|(p, _)| p == path)
          .map(|(_, b)| b.clone())
          .collect()
    }
}

pub fn optimize_response() -> Value
{   json!({
      "original_prompt": "Summarize the quarterly report",
      "optimized_prompt": "Summarize the Q3 report in five bullet points.",
      "suggestions": ["Name the audience", "State the length"],
      "reasoning": "Added a concrete output shape.",
      "model_used": "gpt-4.1",
      "tokens_saved": -4,
      "confidence_score": 0.875
    })
}

pub fn generate_response() -> Value
{   json!({
      "generated_prompt": "You are a code reviewer. Review the diff.",
      "prompt_structure": {
        "context": "Pull request review",
        "objectives": "Find defects",
        "action": "Comment on each issue",
        "support": "Reference line numbers",
        "technology": "GitHub"
      },
      "usage_tips": ["Paste the whole diff"],
      "alternatives": ["Act as a strict reviewer.", "List risks first."],
      "model_used": "gpt-4o",
      "confidence_score": 0.75
    })
}

pub fn valid_result() -> Value
{   json!({ "is_valid": true, "issues": [], "suggestions": [] })
}
