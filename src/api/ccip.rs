// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! CCIP-Read gateway endpoint.

use alloy::primitives::Bytes;
use axum::{extract::State, Json};

use super::ApiJson;
use crate::{
    ccip::{ResolveError, ResolveRequest},
    error::{ApiError, ErrorBody},
    models::{CcipRequest, CcipResponse},
    state::AppState,
};

/// Decode a hex request field; blank counts as missing.
fn hex_param(name: &'static str, value: &str) -> Result<Bytes, ResolveError> {
    let value = value.trim();
    if value.is_empty() || value == "0x" {
        return Err(ResolveError::MissingParameter(name));
    }
    alloy::hex::decode(value)
        .map(Bytes::from)
        .map_err(|e| ResolveError::InvalidParameter(format!("{name}: {e}")))
}

/// Resolve a name for the on-chain resolver and sign the answer.
#[utoipa::path(
    post,
    path = "/v1/ccip",
    request_body = CcipRequest,
    tag = "CCIP",
    responses(
        (status = 200, description = "Signed resolution", body = CcipResponse),
        (status = 400, description = "Missing or malformed parameters", body = ErrorBody),
        (status = 403, description = "Sender is not an allowed resolver", body = ErrorBody),
        (status = 404, description = "Username not registered", body = ErrorBody),
        (status = 500, description = "Lookup or signing failed", body = ErrorBody)
    )
)]
pub async fn resolve(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CcipRequest>,
) -> Result<Json<CcipResponse>, ApiError> {
    let request = ResolveRequest {
        dns_name: hex_param("name", &request.name)?,
        call_data: hex_param("data", &request.data)?,
        sender: hex_param("sender", &request.sender)?,
    };

    let signed = state.resolver.resolve(&request).await?;
    Ok(Json(signed.into()))
}
