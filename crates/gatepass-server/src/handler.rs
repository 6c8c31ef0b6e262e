use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use gatepass_types::{OrderPayload, OwnerId, SignedReceipt, TicketGroupId};
use serde::{Deserialize, Serialize};

use crate::auth::{authorize, Credentials};
use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub user_id: String,
    pub data: OrderPayload,
    pub pin: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    pub user_id: String,
    pub owner_id: OwnerId,
    pub pin: String,
    pub ticket_group_id: TicketGroupId,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResponse {
    pub is_valid: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub original_data: serde_json::Value,
    pub public_key: String,
    pub digital_signature: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub is_verified: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

async fn authenticate(state: &AppState, headers: &HeaderMap) -> ServerResult<OwnerId> {
    state
        .identity
        .authenticate(&Credentials::from_headers(headers))
        .await
}

/// Unwrap a JSON body, hiding parser detail from the caller.
fn read_body<T>(body: Result<Json<T>, JsonRejection>) -> ServerResult<T> {
    body.map(|Json(req)| req).map_err(|rejection| {
        tracing::debug!(error = %rejection, "unreadable request body");
        ServerError::BadRequest("malformed request body".into())
    })
}

fn require_pin(pin: &str) -> ServerResult<()> {
    if pin.is_empty() {
        return Err(ServerError::BadRequest("pin must not be empty".into()));
    }
    Ok(())
}

pub async fn root_handler() -> &'static str {
    ">> Gatepass ticket backend is running..."
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

/// Issue a signed receipt. Record writes continue after the response.
pub async fn order_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<OrderRequest>, JsonRejection>,
) -> ServerResult<Json<SignedReceipt>> {
    let caller = authenticate(&state, &headers).await?;
    let req = read_body(body)?;
    authorize(&caller, &req.user_id)?;
    require_pin(&req.pin)?;
    let issued = state.issuance.issue(&caller, &req.data, &req.pin).await?;
    // Dropping the handle detaches the writes; server shutdown drains them.
    drop(issued.pending);
    Ok(Json(issued.receipt))
}

pub async fn scan_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<ScanRequest>, JsonRejection>,
) -> ServerResult<Json<ScanResponse>> {
    let caller = authenticate(&state, &headers).await?;
    let req = read_body(body)?;
    authorize(&caller, &req.user_id)?;
    require_pin(&req.pin)?;
    let is_valid = state
        .redemption
        .redeem(&req.ticket_group_id, &req.owner_id, &req.pin)
        .await?;
    Ok(Json(ScanResponse { is_valid }))
}

/// Unauthenticated: anyone holding a receipt may check it.
pub async fn verify_handler(
    State(state): State<AppState>,
    body: Result<Json<VerifyRequest>, JsonRejection>,
) -> (StatusCode, Json<VerifyResponse>) {
    let is_verified = match body {
        Ok(Json(req)) => {
            state
                .verification
                .verify(&req.original_data, &req.public_key, &req.digital_signature)
        }
        Err(rejection) => {
            tracing::debug!(error = %rejection, "unreadable verify request");
            false
        }
    };
    let status = if is_verified {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    (status, Json(VerifyResponse { is_verified }))
}
