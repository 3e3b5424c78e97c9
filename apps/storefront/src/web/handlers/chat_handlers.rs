// apps/storefront/src/web/handlers/chat_handlers.rs

use actix_web::{web, HttpResponse};
use tracing::instrument;

use crate::errors::AppError;
use crate::services::chat_relay;
use crate::state::AppState;
use crate::web::payloads::ChatPayload;

#[instrument(name = "handler::chat_stream", skip(app_state, req_payload), fields(message_len = req_payload.message.len()))]
pub async fn chat_stream_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<ChatPayload>,
) -> Result<HttpResponse, AppError> {
  let message = req_payload.into_inner().message;
  if message.trim().is_empty() {
    return Err(AppError::Validation("Message cannot be empty.".to_string()));
  }

  let lines = chat_relay::open_stream(&app_state.http, &app_state.config, &message).await?;
  Ok(HttpResponse::Ok().content_type("application/json").streaming(lines))
}
