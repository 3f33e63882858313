use std::sync::Arc;

use axum::{
  extract::{rejection::JsonRejection, Request, State},
  middleware::{self, Next},
  response::Response,
  routing::{get, post},
  Json, Router,
};
use subtle::ConstantTimeEq;
use utoipa::{
  openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
  Modify, OpenApi,
};

use super::{
  dto::{
    ErrorResponse, MessageResponse, StatisticsResponse, TopTransactionResponse,
    TransactionReceivedResponse, TransactionRequest,
  },
  error::ApiError,
};
use crate::service::TransactionService;

/// Header carrying the shared secret
pub const API_KEY_HEADER: &str = "api-key";

/// Name of the security scheme in the OpenAPI document
const API_KEY_SCHEME: &str = "api_key";

#[derive(OpenApi)]
#[openapi(
  info(
    title = "Financial Transaction Analysis API",
    version = "1.0.0",
    description = "API for managing and analyzing financial transactions"
  ),
  paths(create_transaction, delete_transactions, statistics),
  components(schemas(
    TransactionRequest,
    TransactionReceivedResponse,
    MessageResponse,
    StatisticsResponse,
    TopTransactionResponse,
    ErrorResponse
  )),
  modifiers(&ApiKeySecurity)
)]
struct ApiDoc;

struct ApiKeySecurity;

impl Modify for ApiKeySecurity {
  fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
    if let Some(components) = openapi.components.as_mut() {
      components.add_security_scheme(
        API_KEY_SCHEME,
        SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(API_KEY_HEADER))),
      );
    }
  }
}

#[derive(Clone)]
struct AppState {
  service: TransactionService,
  api_key: Arc<str>,
}

/// Build the router with all the endpoints of the API.
///
/// Every route requires the `api-key` header to match the configured secret,
/// except `/openapi.json` which serves the API documentation.
pub fn router(service: TransactionService, api_key: &str) -> Router {
  let state = AppState {
    service,
    api_key: Arc::from(api_key),
  };

  Router::new()
    .route(
      "/transactions",
      post(create_transaction).delete(delete_transactions),
    )
    .route("/statistics", get(statistics))
    .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key))
    .route("/openapi.json", get(openapi))
    .with_state(state)
}

async fn require_api_key(
  State(state): State<AppState>,
  request: Request,
  next: Next,
) -> Result<Response, ApiError> {
  match request.headers().get(API_KEY_HEADER) {
    Some(value) if api_key_matches(&state.api_key, value.as_bytes()) => {
      Ok(next.run(request).await)
    }
    _ => Err(ApiError::InvalidApiKey),
  }
}

/// Compare in constant time, so the response time does not tell how much of the key was right.
fn api_key_matches(expected: &str, received: &[u8]) -> bool {
  expected.as_bytes().ct_eq(received).into()
}

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
  Json(ApiDoc::openapi())
}

#[utoipa::path(
  post,
  path = "/transactions",
  request_body = TransactionRequest,
  responses(
    (status = 200, description = "Transaction stored", body = TransactionReceivedResponse),
    (status = 400, description = "Duplicated transaction ID or malformed body", body = ErrorResponse),
    (status = 403, description = "Invalid API key", body = ErrorResponse),
    (status = 500, description = "Store unavailable", body = ErrorResponse)
  ),
  security(("api_key" = []))
)]
async fn create_transaction(
  State(state): State<AppState>,
  payload: Result<Json<TransactionRequest>, JsonRejection>,
) -> Result<Json<TransactionReceivedResponse>, ApiError> {
  let Json(request) = payload.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
  let task_id = state.service.create_transaction(request.into()).await?;
  Ok(Json(task_id.into()))
}

#[utoipa::path(
  delete,
  path = "/transactions",
  responses(
    (status = 200, description = "All transactions deleted", body = MessageResponse),
    (status = 403, description = "Invalid API key", body = ErrorResponse),
    (status = 500, description = "Store unavailable", body = ErrorResponse)
  ),
  security(("api_key" = []))
)]
async fn delete_transactions(
  State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
  state.service.delete_all_transactions().await?;
  Ok(Json(MessageResponse::all_deleted()))
}

#[utoipa::path(
  get,
  path = "/statistics",
  responses(
    (status = 200, description = "Statistics over all the transactions", body = StatisticsResponse),
    (status = 403, description = "Invalid API key", body = ErrorResponse),
    (status = 500, description = "Store unavailable", body = ErrorResponse)
  ),
  security(("api_key" = []))
)]
async fn statistics(State(state): State<AppState>) -> Result<Json<StatisticsResponse>, ApiError> {
  let snapshot = state.service.statistics().await?;
  Ok(Json(snapshot.into()))
}
