//! Axum REST handlers: read-only projections of on-chain state.
//!
//! No write endpoint exists here; writes are client-signed (see the
//! `set-value` binary).

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::chain::ChainReader;
use crate::errors::GatewayError;
use crate::events::{ContractEvent, EventFetcher, EventKind};

pub struct ApiState {
    pub reader: ChainReader,
    pub fetcher: EventFetcher,
}

pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/blockchain/value", get(get_value))
        .route("/blockchain/owner", get(get_owner))
        .route("/blockchain/events", get(get_events))
        .with_state(state)
}

// ─────────────────────────────────────────────────────────
// Response shapes
// ─────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueResponse {
    /// Arbitrary-precision JSON number; uint256 survives the projection.
    pub value: serde_json::Number,
    pub block_number: u64,
    pub updated_at: String,
}

#[derive(Serialize)]
pub struct OwnerResponse {
    pub owner: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueEventRecord {
    pub block_number: u64,
    pub value: String,
    pub tx_hash: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerEventRecord {
    pub block_number: u64,
    pub old_owner: String,
    pub new_owner: String,
    pub tx_hash: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Deserialize)]
pub struct EventsQuery {
    #[serde(default)]
    pub kind: Option<EventKind>,
}

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /blockchain/value`
///
/// The current stored value in the context of the latest block.
pub async fn get_value(State(state): State<Arc<ApiState>>) -> Response {
    match read_value(&state).await {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(e) => error_response(e),
    }
}

async fn read_value(state: &ApiState) -> crate::errors::Result<ValueResponse> {
    let snapshot = state.reader.snapshot().await?;
    let value: serde_json::Number = serde_json::from_str(&snapshot.value.to_string())
        .map_err(|e| GatewayError::Decode(format!("value out of JSON range: {e}")))?;
    Ok(ValueResponse {
        value,
        block_number: snapshot.block_number,
        updated_at: snapshot
            .observed_at
            .to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

/// `GET /blockchain/owner`
pub async fn get_owner(State(state): State<Arc<ApiState>>) -> Response {
    match state.reader.owner().await {
        Ok(owner) => (
            StatusCode::OK,
            Json(OwnerResponse {
                owner: format!("{owner:#x}"),
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// `GET /blockchain/events?kind=value_updated|owner_set`
///
/// Returns a bare array. The scan window is bounded, so an empty array
/// just means no matching logs in the trailing window.
pub async fn get_events(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<EventsQuery>,
) -> Response {
    let kind = query.kind.unwrap_or(EventKind::ValueUpdated);
    match state.fetcher.fetch(kind).await {
        Ok(events) => match kind {
            EventKind::ValueUpdated => {
                Json(events.iter().filter_map(value_record).collect::<Vec<_>>()).into_response()
            }
            EventKind::OwnerSet => {
                Json(events.iter().filter_map(owner_record).collect::<Vec<_>>()).into_response()
            }
        },
        Err(e) => error_response(e),
    }
}

fn value_record(event: &ContractEvent) -> Option<ValueEventRecord> {
    match event {
        ContractEvent::ValueUpdated(ev) => Some(ValueEventRecord {
            block_number: ev.block_number,
            value: ev.new_value.to_string(),
            tx_hash: format!("{:#x}", ev.tx_hash),
        }),
        ContractEvent::OwnerSet(_) => None,
    }
}

fn owner_record(event: &ContractEvent) -> Option<OwnerEventRecord> {
    match event {
        ContractEvent::OwnerSet(ev) => Some(OwnerEventRecord {
            block_number: ev.block_number,
            old_owner: format!("{:#x}", ev.old_owner),
            new_owner: format!("{:#x}", ev.new_owner),
            tx_hash: format!("{:#x}", ev.tx_hash),
        }),
        ContractEvent::ValueUpdated(_) => None,
    }
}

fn error_response(err: GatewayError) -> Response {
    let status = match err {
        GatewayError::NodeUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        GatewayError::ContractCallReverted(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

// ─────────────────────────────────────────────────────────
// Endpoint tests
// ─────────────────────────────────────────────────────────
