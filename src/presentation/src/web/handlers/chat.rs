//! Chat relay handler

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use shared::Error;

use domain::models::{RelayRequest, EMPTY_MESSAGE_ERROR};

use crate::web::state::AppState;

/// Streams the upstream answer back as `text/event-stream`. Only a missing
/// or blank message is answered with an error status; upstream failures
/// arrive as an error event inside a normal 200 stream. A body that is not
/// a JSON object carries no message either.
pub async fn relay_chat(
    State(state): State<AppState>,
    payload: Result<Json<RelayRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "Rejected chat body");
            return bad_request(EMPTY_MESSAGE_ERROR.to_string());
        }
    };

    match state.relay.handle(request) {
        Ok(stream) => (
            [
                (header::CONTENT_TYPE, "text/event-stream"),
                (header::CACHE_CONTROL, "no-cache"),
                (header::CONNECTION, "keep-alive"),
                (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
                (header::ACCESS_CONTROL_ALLOW_HEADERS, "Cache-Control"),
            ],
            Body::from_stream(stream),
        )
            .into_response(),
        Err(Error::InvalidInput(message)) => bad_request(message),
        Err(e) => {
            tracing::error!(error = %e, "Chat relay failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

fn bad_request(message: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}
