// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relayed transfer endpoint.

use axum::{extract::State, Json};
use tracing::info;

use super::ApiJson;
use crate::{
    error::{ApiError, ErrorBody},
    models::{TransferRelayRequest, TransferRelayResponse},
    relay::transfer::parse_transfer,
    state::AppState,
};

/// Submit a user-signed Telepay transfer from the service wallet.
///
/// Returns once the transaction is mined.
#[utoipa::path(
    post,
    path = "/v1/transfer",
    request_body = TransferRelayRequest,
    tag = "Transfers",
    responses(
        (status = 200, description = "Transfer mined", body = TransferRelayResponse),
        (status = 400, description = "Missing or malformed parameters", body = ErrorBody),
        (status = 500, description = "Transfer failed", body = ErrorBody),
        (status = 503, description = "Transfers are not configured", body = ErrorBody)
    )
)]
pub async fn relay_transfer(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<TransferRelayRequest>,
) -> Result<Json<TransferRelayResponse>, ApiError> {
    let transfer = parse_transfer(
        &body.amount.as_text(),
        &body.source_pub_key,
        &body.target_pub_key,
        &body.signature,
    )?;

    let relay = state.transfer.as_ref().ok_or_else(|| {
        ApiError::service_unavailable("Transfer relay is not configured")
            .with_kind("TRANSFER_DISABLED")
    })?;

    info!(amount = %transfer.amount, "Processing transfer");
    let tx_hash = relay.transfer(&transfer).await?;
    Ok(Json(tx_hash.into()))
}
