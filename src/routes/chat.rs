use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::{Instrument, debug, info_span};
use uuid::Uuid;

use crate::{
    error::AppError,
    message::{ChatReply, ChatRequest, HealthResponse},
    state::SharedState,
};

pub async fn chat_handler(
    State(state): State<SharedState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, AppError> {
    // An undecodable body is handled the same as a body without a message.
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!(%rejection, "chat body could not be decoded");
            ChatRequest::default()
        }
    };

    let span = info_span!("chat", request_id = %Uuid::new_v4());
    let reply = state.relay.handle_chat(request).instrument(span).await?;
    Ok(Json(reply))
}

// Never touches the upstream.
pub async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        message: "Server is running".to_string(),
        api_key_configured: state.relay.is_configured(),
        api_key_format_valid: state.api_key_format_valid,
        model: state.relay.settings().model.clone(),
    })
}
