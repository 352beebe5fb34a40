//! HTTP ingest handler.
//!
//! `POST /` with query, urlencoded form, or multipart form parameters:
//! - 200: one datagram handed to the collector
//! - 415: type code did not resolve; nothing sent
//! - 400: undecodable parameters
//! - 500: the emitter could not be built or the send failed
//!
//! Responses carry no body; the status is the whole answer.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use mcstats_core::error::{ClientCode, RelayError, Result};
use mcstats_core::translate::translate;

use crate::app_state::AppState;
use crate::transport::codec::decode_request;

/// Error surfaced to the HTTP layer as a bare status code.
#[derive(Debug)]
pub struct ApiError(pub RelayError);

impl From<RelayError> for ApiError {
    fn from(e: RelayError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.client_code();
        match code {
            ClientCode::UnsupportedMetricType | ClientCode::BadRequest => {
                tracing::warn!(code = code.as_str(), error = %self.0, "request rejected");
            }
            _ => {
                tracing::error!(code = code.as_str(), error = %self.0, "request failed");
            }
        }
        StatusCode::from_u16(code.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            .into_response()
    }
}

pub async fn ingest(
    State(app): State<AppState>,
    req: Request,
) -> std::result::Result<StatusCode, ApiError> {
    relay(&app, req).await?;
    Ok(StatusCode::OK)
}

async fn relay(app: &AppState, req: Request) -> Result<()> {
    let params = decode_request(req).await?;
    let event = translate(&params)?;

    let emitter = app.emitter().await?;
    emitter.emit(&event).await?;

    tracing::info!(
        kind = %event.kind,
        stat = %event.name,
        value = %event.value,
        rate = ?event.options.sample_rate,
        tags = event.options.tags.len(),
        "metric relayed"
    );
    Ok(())
}
