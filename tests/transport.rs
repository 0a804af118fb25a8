mod common;

use std::time::Duration;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio_test::{assert_err, assert_ok};

use common::*;
use prompt_optimizer::error::{Operation, TransportError};
use prompt_optimizer::validation::{GenerateForm, OptimizeForm};

#[tokio::test]
async fn optimize_posts_only_present_fields()
{   let recorder = Recorder::default();
    let router = Router::new().route("/optimize", post({
      let recorder = recorder.clone();
      move |Json(body): Json<Value>| async move {
        recorder.record("/optimize", body);
        Json(optimize_response())
      }
    }));
    let client = client_for(&spawn_backend(router).await);

    let form = OptimizeForm
    {   prompt: "Summarize the quarterly report".to_string()
      , context: "   ".to_string()
      , base_url: String::new()
      , ..OptimizeForm::default()
    };
    let request = assert_ok!(form.build());
    let response = assert_ok!(client.optimize_prompt(&request).await);
    assert_eq!(response.tokens_saved, -4);
    assert_eq!(response.suggestions.len(), 2);

    let sent = recorder.bodies_for("/optimize");
    assert_eq!(sent.len(), 1);
    let body = sent[0].as_object().unwrap();
    assert_eq!(body["prompt"], "Summarize the quarterly report");
    assert_eq!(body["optimization_goal"], "general");
    assert!(!body.contains_key("context"));
    assert!(!body.contains_key("api_key"));
    assert!(!body.contains_key("base_url"));
}

#[tokio::test]
async fn generate_omits_blank_examples()
{   let recorder = Recorder::default();
    let router = Router::new().route("/generate", post({
      let recorder = recorder.clone();
      move |Json(body): Json<Value>| async move {
        recorder.record("/generate", body);
        Json(generate_response())
      }
    }));
    let client = client_for(&spawn_backend(router).await);

    let form = GenerateForm
    {   requirements: "A prompt for reviewing pull requests".to_string()
      , examples: vec!["".to_string(), "  ".to_string()]
      , ..GenerateForm::default()
    };
    let response = assert_ok!(
      client.generate_prompt(&assert_ok!(form.build())).await
    );
    assert_eq!(response.prompt_structure.technology, "GitHub");
    assert_eq!(response.alternatives.len(), 2);

    let body = recorder.bodies_for("/generate").remove(0);
    assert!(body.get("examples").is_none());
    assert!(body.get("constraints").is_none());
}

#[tokio::test]
async fn optimize_timeout_has_exact_wording()
{   let router = Router::new().route("/optimize", post(|| async {
      tokio::time::sleep(Duration::from_secs(5)).await;
      Json(optimize_response())
    }));
    let client = impatient_client_for(&spawn_backend(router).await);

    let request = assert_ok!(OptimizeForm
    {   prompt: "Explain borrowing".to_string()
      , ..OptimizeForm::default()
    }.build());
    let err = assert_err!(client.optimize_prompt(&request).await);
    assert!(err.is_timeout());
    assert_eq!(
      err.to_string(),
      "Request timeout - the OpenAI API is taking too long to respond. \
       Please try again or check your API key."
    );
}

#[tokio::test]
async fn unauthorized_ignores_the_body()
{   let router = Router::new().route("/generate", post(|| async {
      (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "detail": "Incorrect API key provided: sk-abc" }))
      )
    }));
    let client = client_for(&spawn_backend(router).await);

    let request = assert_ok!(GenerateForm
    {   requirements: "anything".to_string()
      , ..GenerateForm::default()
    }.build());
    let err = assert_err!(client.generate_prompt(&request).await);
    assert_eq!(err, TransportError::Unauthorized(Operation::Generate));
    assert_eq!(
      err.to_string(),
      "Authentication failed - please check your OpenAI API key."
    );
}

#[tokio::test]
async fn server_errors_use_the_generic_server_message()
{   let router = Router::new().route("/task-types", get(|| async {
      (
        StatusCode::BAD_GATEWAY,
        Json(json!({ "detail": "upstream exploded" }))
      )
    }));
    let client = client_for(&spawn_backend(router).await);

    let err = assert_err!(client.get_task_types().await);
    assert_eq!(
      err.to_string(),
      "Server error - please check if the backend service is running \
       and your API key is valid."
    );
}

#[tokio::test]
async fn client_errors_surface_the_detail()
{   let router = Router::new().route("/optimize", post(|| async {
      (
        StatusCode::BAD_REQUEST,
        Json(json!({ "detail": "Unknown optimization goal" }))
      )
    }));
    let client = client_for(&spawn_backend(router).await);

    let request = assert_ok!(OptimizeForm
    {   prompt: "Explain borrowing".to_string()
      , ..OptimizeForm::default()
    }.build());
    let err = assert_err!(client.optimize_prompt(&request).await);
    assert_eq!(err.to_string(), "Request failed: Unknown optimization goal");
}

#[tokio::test]
async fn missing_endpoint_reports_the_status()
{   let client = client_for(&spawn_backend(Router::new()).await);
    let err = assert_err!(client.get_models().await);
    assert_eq!(
      err.to_string(),
      "Failed to fetch models: Request failed with status code 404"
    );
}

#[tokio::test]
async fn malformed_body_keeps_the_raw_message()
{   let router = Router::new()
      .route("/models", get(|| async { "definitely not json" }));
    let client = client_for(&spawn_backend(router).await);
    let err = assert_err!(client.get_models().await);
    assert!(matches!(err, TransportError::Failed { .. }));
    assert!(err.to_string().starts_with("Failed to fetch models: "));
}

#[tokio::test]
async fn unreachable_backend_is_a_generic_failure()
{   let client = client_for(&dead_backend().await);
    let err = assert_err!(client.health_check().await);
    assert_eq!(err.operation(), Operation::Health);
    assert!(err.to_string().starts_with("Health check failed: "));
}

#[tokio::test]
async fn models_keep_backend_order()
{   let models = json!([
      { "model_name": "gpt-4.1", "description": "Flagship",
        "max_tokens": 8192,
        "pricing_per_1k_tokens": { "input": 0.03, "output": 0.06 } },
      { "model_name": "gpt-4o", "description": "Omni",
        "max_tokens": 8192,
        "pricing_per_1k_tokens": { "input": 0.03, "output": 0.06 } },
      { "model_name": "gpt-3.5-turbo", "description": "Legacy",
        "max_tokens": 4096,
        "pricing_per_1k_tokens": { "input": 0.0015, "output": 0.002 } },
      { "model_name": "gpt-4o-mini", "description": "Small",
        "max_tokens": 8192,
        "pricing_per_1k_tokens": { "input": 0.03, "output": 0.06 } }
    ]);
    let router = Router::new().route("/models", get(move || {
      let models = models.clone();
      async move { Json(models) }
    }));
    let client = client_for(&spawn_backend(router).await);

    let fetched = assert_ok!(client.get_models().await);
    let names: Vec<&str> = fetched.iter()
      .map(|m| m.model_name.as_str())
      .collect();
    assert_eq!(names, vec!["gpt-4.1", "gpt-4o", "gpt-3.5-turbo", "gpt-4o-mini"]);
    assert_eq!(fetched[2].max_tokens, 4096);
}

#[tokio::test]
async fn catalog_envelopes_are_unwrapped()
{   let router = Router::new()
      .route("/optimization/types", get(|| async {
        Json(json!({ "types": [
          { "type": "clarity", "description": "Clearer" },
          { "type": "general", "description": "General" }
        ]}))
      }))
      .route("/output-formats", get(|| async {
        Json(json!({ "formats": [
          { "format": "json", "description": "Structured JSON format" }
        ]}))
      }))
      .route("/health", get(|| async {
        Json(json!({ "status": "healthy", "service": "prompt-optimizer" }))
      }));
    let client = client_for(&spawn_backend(router).await);

    let goals = assert_ok!(client.get_optimization_types().await);
    assert_eq!(goals[0].name, "clarity");
    let formats = assert_ok!(client.get_output_formats().await);
    assert_eq!(formats[0].format, "json");
    let health = assert_ok!(client.health_check().await);
    assert_eq!(health.status, "healthy");
    assert_eq!(health.service, "prompt-optimizer");
}

#[tokio::test]
async fn validate_sends_the_prompt_in_the_body()
{   let recorder = Recorder::default();
    let router = Router::new().route("/validate", post({
      let recorder = recorder.clone();
      move |Json(body): Json<Value>| async move {
        recorder.record("/validate", body);
        Json(json!({
          "is_valid": false,
          "issues": ["Prompt is too vague"],
          "suggestions": ["Be specific about what you want"]
        }))
      }
    }));
    let client = client_for(&spawn_backend(router).await);

    let result = assert_ok!(client.validate_prompt("do the thing").await);
    assert!(!result.is_valid);
    assert_eq!(result.issues, vec!["Prompt is too vague"]);
    assert_eq!(
      recorder.bodies_for("/validate"),
      vec![json!({ "prompt": "do the thing" })]
    );
}

#[tokio::test]
async fn empty_detail_falls_back_to_the_status()
{   let router = Router::new().route("/models", get(|| async {
      (StatusCode::BAD_REQUEST, Json(json!({ "detail": "" })))
    }));
    let client = client_for(&spawn_backend(router).await);
    let err = assert_err!(client.get_models().await);
    assert_eq!(
      err.to_string(),
      "Failed to fetch models: Request failed with status code 400"
    );
}
