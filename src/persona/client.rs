use crate::error::PersonaError;
use crate::persona::api_types::{Ack, ApiErrorBody, ApiPersona, DeleteBody, PersonaWrite};
use crate::persona::types::{Persona, PersonaFields};
use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use reqwest::{Method, Response, StatusCode};
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

/// The four operations of the persona resource.
///
/// Implementations only talk to the server; they never touch local state.
#[async_trait]
pub trait PersonaApi: Send + Sync {
  /// Fetch the full collection, in server order
  async fn list_all(&self) -> Result<Vec<Persona>, PersonaError>;

  /// Create a record; the request carries identifier 0
  async fn create(&self, fields: &PersonaFields) -> Result<Ack, PersonaError>;

  /// Update the record with the given (server-assigned) identifier
  async fn update(&self, id: i64, fields: &PersonaFields) -> Result<Ack, PersonaError>;

  async fn delete(&self, id: i64) -> Result<Ack, PersonaError>;
}

/// HTTP client for a single persona endpoint
#[derive(Clone)]
pub struct PersonaClient {
  http: reqwest::Client,
  endpoint: Url,
}

impl PersonaClient {
  pub fn new(endpoint: Url) -> Result<Self> {
    let http = reqwest::Client::builder()
      .user_agent(concat!("p9s/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { http, endpoint })
  }

  /// Send a JSON body with the given verb and decode the acknowledgement.
  async fn send_json<B: Serialize + ?Sized>(&self, method: Method, body: &B) -> Result<Ack, PersonaError> {
    debug!(%method, endpoint = %self.endpoint, "sending request");

    let response = self
      .http
      .request(method.clone(), self.endpoint.clone())
      .json(body)
      .send()
      .await?;

    let response = check_status(response).await?;
    let value = response
      .json::<serde_json::Value>()
      .await
      .map_err(|e| PersonaError::Network(format!("invalid response to {}: {}", method, e)))?;

    Ok(Ack(value))
  }
}

/// Turn a non-success response into `PersonaError::Api`, reading the
/// optional `message` field of its JSON body.
async fn check_status(response: Response) -> Result<Response, PersonaError> {
  let status = response.status();
  if status.is_success() {
    return Ok(response);
  }

  let body = response.bytes().await.unwrap_or_default();
  let err = rejection(status, &body);
  warn!(status = status.as_u16(), error = %err, "request rejected");
  Err(err)
}

/// Error for a rejected mutation. A body that is not JSON, or has no
/// `message`, still counts as an API rejection, just without a message.
fn rejection(status: StatusCode, body: &[u8]) -> PersonaError {
  let body: ApiErrorBody = serde_json::from_slice(body).unwrap_or_default();
  PersonaError::Api {
    status: status.as_u16(),
    message: body.message,
  }
}

/// Error for a failed list call. The table only distinguishes "data" from
/// "no data", so any bad status is a connectivity failure.
fn list_failure(status: StatusCode) -> PersonaError {
  PersonaError::Network(format!("server responded with {}", status))
}

#[async_trait]
impl PersonaApi for PersonaClient {
  async fn list_all(&self) -> Result<Vec<Persona>, PersonaError> {
    debug!(endpoint = %self.endpoint, "fetching personas");

    let response = self.http.get(self.endpoint.clone()).send().await?;

    let status = response.status();
    if !status.is_success() {
      return Err(list_failure(status));
    }

    let records: Vec<ApiPersona> = response
      .json()
      .await
      .map_err(|e| PersonaError::Network(format!("failed to parse personas: {}", e)))?;

    Ok(records.into_iter().map(ApiPersona::into_persona).collect())
  }

  async fn create(&self, fields: &PersonaFields) -> Result<Ack, PersonaError> {
    self
      .send_json(Method::POST, &PersonaWrite::for_create(fields))
      .await
  }

  async fn update(&self, id: i64, fields: &PersonaFields) -> Result<Ack, PersonaError> {
    self
      .send_json(Method::PATCH, &PersonaWrite::for_update(id, fields))
      .await
  }

  async fn delete(&self, id: i64) -> Result<Ack, PersonaError> {
    self
      .send_json(Method::DELETE, &DeleteBody { id_persona: id })
      .await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn test_rejection_keeps_server_message() {
    let err = rejection(
      StatusCode::BAD_REQUEST,
      br#"{"message": "fecha invalida"}"#,
    );
    assert_eq!(
      err,
      PersonaError::Api {
        status: 400,
        message: Some("fecha invalida".to_string()),
      }
    );
  }

  #[test]
  fn test_rejection_without_json_body() {
    let err = rejection(
      StatusCode::INTERNAL_SERVER_ERROR,
      b"<html>Internal Server Error</html>",
    );
    assert_eq!(
      err,
      PersonaError::Api {
        status: 500,
        message: None,
      }
    );
    assert_eq!(
      rejection(StatusCode::CONFLICT, b""),
      PersonaError::Api {
        status: 409,
        message: None,
      }
    );
  }

  #[test]
  fn test_rejection_without_message_field() {
    let err = rejection(StatusCode::NOT_FOUND, br#"{"error": "missing"}"#);
    assert_eq!(err.api_message_or("unknown error"), "unknown error");
  }

  #[test]
  fn test_list_failure_is_network() {
    assert!(matches!(
      list_failure(StatusCode::SERVICE_UNAVAILABLE),
      PersonaError::Network(_)
    ));
  }
}
