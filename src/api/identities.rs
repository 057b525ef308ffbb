// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Username registry endpoints.

use std::str::FromStr;

use alloy::primitives::Address;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use super::ApiJson;
use crate::{
    error::{ApiError, ErrorBody},
    identity::{normalize_username, IdentityRecord},
    models::{Identity, RegisterIdentityRequest},
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/v1/identities/{username}",
    params(
        ("username" = String, Path, description = "Username to look up (case-insensitive)")
    ),
    tag = "Identities",
    responses(
        (status = 200, body = Identity),
        (status = 404, body = ErrorBody)
    )
)]
pub async fn get_identity(
    Path(username): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Identity>, ApiError> {
    let username = normalize_username(&username);
    let record = state
        .identities()
        .find_by_username(&username)
        .await?
        .ok_or_else(|| {
            ApiError::not_found("No public key found for username").with_kind("IDENTITY_NOT_FOUND")
        })?;
    Ok(Json(record.into()))
}

#[utoipa::path(
    post,
    path = "/v1/identities",
    request_body = RegisterIdentityRequest,
    tag = "Identities",
    responses(
        (status = 201, body = Identity),
        (status = 400, body = ErrorBody),
        (status = 409, description = "Username already registered", body = ErrorBody),
        (status = 501, description = "Backend does not accept registrations", body = ErrorBody)
    )
)]
pub async fn register_identity(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterIdentityRequest>,
) -> Result<(StatusCode, Json<Identity>), ApiError> {
    let username = normalize_username(&request.username);
    if username.is_empty() || username.contains('.') {
        return Err(ApiError::bad_request("Username must be a single non-empty label")
            .with_kind("INVALID_PARAMETER"));
    }
    let public_key = Address::from_str(request.public_key.trim()).map_err(|e| {
        ApiError::bad_request("Invalid public key")
            .with_kind("INVALID_PARAMETER")
            .with_details(e.to_string())
    })?;

    let record = IdentityRecord {
        username,
        public_key,
    };
    state.identities().register(record.clone()).await?;
    info!(username = %record.username, address = %record.public_key, "Registered identity");

    Ok((StatusCode::CREATED, Json(record.into())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tests::test_state;

    fn request(username: &str) -> RegisterIdentityRequest {
        RegisterIdentityRequest {
            username: username.into(),
            public_key: "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".into(),
        }
    }

    #[tokio::test]
    async fn get_identity_is_case_insensitive() {
        let Json(identity) = get_identity(Path("Alice".into()), State(test_state()))
            .await
            .unwrap();
        assert_eq!(identity.username, "alice");
        assert_eq!(
            identity.public_key,
            "0x1111111111111111111111111111111111111111"
        );
    }

    #[tokio::test]
    async fn unknown_identity_is_not_found() {
        let err = get_identity(Path("bob".into()), State(test_state()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn register_then_resolve() {
        let state = test_state();
        let (status, Json(created)) =
            register_identity(State(state.clone()), ApiJson(request("Bob")))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.username, "bob");

        let Json(found) = get_identity(Path("bob".into()), State(state)).await.unwrap();
        assert_eq!(found, created);
    }

    #[tokio::test]
    async fn duplicate_registration_is_conflict() {
        let err = register_identity(State(test_state()), ApiJson(request("alice")))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn invalid_registrations_are_rejected() {
        let err = register_identity(State(test_state()), ApiJson(request("bob.eth")))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let mut bad_key = request("bob");
        bad_key.public_key = "0x1234".into();
        let err = register_identity(State(test_state()), ApiJson(bad_key))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
