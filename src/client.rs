use std::time::Duration;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use log::{debug, trace, error};

use crate::catalog::
{ FormatsEnvelope, ModelInfo, OptimizationType, OutputFormat, TaskType
, TypesEnvelope
};
use crate::error::{Failure, Operation, TransportError};
use crate::request::
{ ErrorBody, GenerateRequest, GenerateResponse, HealthStatus
, OptimizeRequest, OptimizeResponse, ValidateBody, ValidationResult
};

pub type TransportResult<T> = Result<T, TransportError>;

/// Single point of contact with the prompt-optimizer backend.
///
/// One method per backend capability, one outbound call per method,
/// no retries. Every failure comes back as a [`TransportError`]
/// whose `Display` is the message to show.
#[derive(Debug, Clone)]
pub struct ApiClient
{   config: crate::config::ClientConfig
  , http_client: reqwest::Client
}

impl ApiClient
{   /// Create a client for the configured base URL
    pub fn new(
      config: crate::config::ClientConfig
    ) -> Result<Self, crate::error::Error>
    {   config.validate()?;
        debug!("Creating ApiClient for {}", config.api_base());
        let http_client = reqwest::Client::builder()
          .build()
          .map_err(|e| {
            error!("Failed to build HTTP client: {}", e);
            crate::error::Error::InvalidConfiguration(e.to_string())
          })?;
        Ok(ApiClient
        {   config
          , http_client
        })
    }

    pub fn config(&self) -> &crate::config::ClientConfig
    {   &self.config
    }

    /// `POST /optimize`
    pub async fn optimize_prompt(
      &self
    , request: &OptimizeRequest
    ) -> TransportResult<OptimizeResponse>
    {   debug!("optimize_prompt with model: {}", request.model);
        trace!("Optimize request: {:?}", request);
        self.post(Operation::Optimize, "/optimize", request).await
    }

    /// `POST /generate`
    pub async fn generate_prompt(
      &self
    , request: &GenerateRequest
    ) -> TransportResult<GenerateResponse>
    {   debug!("generate_prompt with model: {}", request.model);
        trace!("Generate request: {:?}", request);
        self.post(Operation::Generate, "/generate", request).await
    }

    /// `POST /validate` with `{prompt}`
    pub async fn validate_prompt(
      &self
    , prompt: &str
    ) -> TransportResult<ValidationResult>
    {   let body = ValidateBody { prompt: prompt.to_string() };
        self.post(Operation::Validate, "/validate", &body).await
    }

    /// `GET /models`, order preserved
    pub async fn get_models(&self) -> TransportResult<Vec<ModelInfo>>
    {   let models: Vec<ModelInfo>
          = self.get(Operation::Models, "/models").await?;
        debug!("Retrieved {} models", models.len());
        Ok(models)
    }

    /// `GET /optimization/types`
    pub async fn get_optimization_types(
      &self
    ) -> TransportResult<Vec<OptimizationType>>
    {   let envelope: TypesEnvelope<OptimizationType> = self
          .get(Operation::OptimizationTypes, "/optimization/types")
          .await?;
        Ok(envelope.types)
    }

    /// `GET /task-types`
    pub async fn get_task_types(&self) -> TransportResult<Vec<TaskType>>
    {   let envelope: TypesEnvelope<TaskType>
          = self.get(Operation::TaskTypes, "/task-types").await?;
        Ok(envelope.types)
    }

    /// `GET /output-formats`
    pub async fn get_output_formats(
      &self
    ) -> TransportResult<Vec<OutputFormat>>
    {   let envelope: FormatsEnvelope = self
          .get(Operation::OutputFormats, "/output-formats")
          .await?;
        Ok(envelope.formats)
    }

    /// `GET /health`
    pub async fn health_check(&self) -> TransportResult<HealthStatus>
    {   self.get(Operation::Health, "/health").await
    }

    fn timeout_for(&self, operation: Operation) -> Duration
    {   match operation
        {   Operation::Optimize | Operation::Generate => {
              self.config.request_timeout()
            }
          , _ => self.config.catalog_timeout()
        }
    }

    async fn get<T: DeserializeOwned>(
      &self
    , operation: Operation
    , path: &str
    ) -> TransportResult<T>
    {   self.call::<(), T>(operation, Method::GET, path, None).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
      &self
    , operation: Operation
    , path: &str
    , body: &B
    ) -> TransportResult<T>
    {   self.call(operation, Method::POST, path, Some(body)).await
    }

    async fn call<B: Serialize, T: DeserializeOwned>(
      &self
    , operation: Operation
    , method: Method
    , path: &str
    , body: Option<&B>
    ) -> TransportResult<T>
    {   let url = format!("{}{}", self.config.api_base(), path);
        trace!("{} {} ({})", method, url, operation);

        let mut builder = self.http_client
          .request(method, url.as_str())
          .timeout(self.timeout_for(operation))
          .header("Content-Type", "application/json");
        if let Some(body) = body
        {   builder = builder.json(body);
        }

        let response = builder
          .send()
          .await
          .map_err(|e| translate(operation, e))?;

        let status = response.status();
        trace!("{} response status: {}", operation, status);

        if !status.is_success()
        {   let detail = response.json::<ErrorBody>().await
              .ok()
              .and_then(|b| b.detail_text());
            let err = TransportError::classify(
              operation,
              Failure::Status
              {   code: status.as_u16()
                , detail
              }
            );
            error!("{} failed with {}: {}", operation, status, err);
            return Err(err);
        }

        response.json::<T>().await
          .map_err(|e| translate(operation, e))
    }
}

/// Map a raw reqwest error through the shared translation table
fn translate(operation: Operation, e: reqwest::Error) -> TransportError
{   let failure = if e.is_timeout()
    {   Failure::TimedOut
    } else if let Some(status) = e.status()
    {   Failure::Status { code: status.as_u16(), detail: None }
    } else
    {   Failure::Other(e.to_string())
    };
    let err = TransportError::classify(operation, failure);
    error!("{} failed: {}", operation, err);
    err
}
