// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    ccip::ResolveError,
    identity::IdentityStoreError,
    models::LegOutcome,
    relay::{RelayError, TransferError},
};

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<String>,
    pub kind: Option<&'static str>,
    pub outcomes: Option<Vec<LegOutcome>>,
}

/// Error body returned by every endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Stable, human-readable error summary.
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Machine-readable error code.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Per-message results gathered before the failure (deposit only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcomes: Option<Vec<LegOutcome>>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
            kind: None,
            outcomes: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_kind(mut self, kind: &'static str) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_outcomes(mut self, outcomes: Vec<LegOutcome>) -> Self {
        self.outcomes = Some(outcomes);
        self
    }

    /// Attach `err` as details; the `dev` feature adds its debug rendering.
    fn describe<E: std::fmt::Display + std::fmt::Debug>(self, err: &E) -> Self {
        #[cfg(feature = "dev")]
        let details = format!("{err} ({err:?})");
        #[cfg(not(feature = "dev"))]
        let details = err.to_string();
        self.with_details(details)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(rejection.status(), "Invalid request body")
            .with_kind("INVALID_BODY")
            .with_details(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
            details: self.details,
            kind: self.kind.map(str::to_string),
            outcomes: self.outcomes,
        });
        (self.status, body).into_response()
    }
}

impl From<ResolveError> for ApiError {
    fn from(err: ResolveError) -> Self {
        let (status, message) = match &err {
            ResolveError::MissingParameter(_) => {
                (StatusCode::BAD_REQUEST, "Missing required parameters")
            }
            ResolveError::InvalidParameter(_) => (StatusCode::BAD_REQUEST, "Invalid parameter"),
            ResolveError::SenderNotAllowed(_) => (StatusCode::FORBIDDEN, "Sender not allowed"),
            ResolveError::MalformedName(_)
            | ResolveError::UnrecognizedPrefix(_)
            | ResolveError::MalformedCall(_) => (StatusCode::BAD_REQUEST, "Malformed resolver call"),
            ResolveError::UnsupportedSelector(_) => {
                (StatusCode::BAD_REQUEST, "Unsupported function selector")
            }
            ResolveError::IdentityNotFound(_) => {
                (StatusCode::NOT_FOUND, "No public key found for username")
            }
            ResolveError::IdentityLookup(_) | ResolveError::SigningFailure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "CCIP processing failed")
            }
        };
        ApiError::new(status, message)
            .with_kind(err.kind())
            .describe(&err)
    }
}

impl From<RelayError> for ApiError {
    fn from(err: RelayError) -> Self {
        let (status, message) = match &err {
            RelayError::MissingParameter(_) => {
                (StatusCode::BAD_REQUEST, "Missing depositTxHash or chain")
            }
            RelayError::InvalidParameter(_) => (StatusCode::BAD_REQUEST, "Invalid parameter"),
            RelayError::UnsupportedChain(_) => (StatusCode::BAD_REQUEST, "Unsupported chain"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "Deposit processing failed"),
        };
        ApiError::new(status, message)
            .with_kind(err.kind())
            .describe(&err)
    }
}

impl From<TransferError> for ApiError {
    fn from(err: TransferError) -> Self {
        let (status, message) = match &err {
            TransferError::MissingParameter(_) => {
                (StatusCode::BAD_REQUEST, "Missing required parameters")
            }
            TransferError::InvalidParameter { .. } => (StatusCode::BAD_REQUEST, "Invalid parameter"),
            TransferError::Chain(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Transfer failed"),
        };
        ApiError::new(status, message)
            .with_kind(err.kind())
            .describe(&err)
    }
}

impl From<IdentityStoreError> for ApiError {
    fn from(err: IdentityStoreError) -> Self {
        let (status, message, kind) = match &err {
            IdentityStoreError::AlreadyExists(_) => (
                StatusCode::CONFLICT,
                "Public key already exists for this username",
                "IDENTITY_EXISTS",
            ),
            IdentityStoreError::ReadOnly => (
                StatusCode::NOT_IMPLEMENTED,
                "Identity backend is read-only",
                "READ_ONLY",
            ),
            IdentityStoreError::Backend(_) => (
                StatusCode::BAD_GATEWAY,
                "Identity backend unavailable",
                "IDENTITY_LOOKUP_FAILED",
            ),
        };
        ApiError::new(status, message).with_kind(kind).describe(&err)
    }
}
