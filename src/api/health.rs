// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::time::Duration;

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use crate::state::AppState;

/// Upper bound on each relay destination check.
const DESTINATION_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Health check response with individual component status.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Overall health status ("ok" or "degraded").
    pub status: String,
    /// Individual health checks and their results.
    pub checks: HealthChecks,
}

/// Individual health check results.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthChecks {
    /// Whether the service process is running.
    pub service: String,
    /// Address that signs CCIP-Read responses.
    pub signer: String,
    /// Identity backend in use (`memory` or `http`).
    pub identity_backend: String,
    /// Deposit relay status (`enabled` or `disabled`).
    pub relay: String,
    /// Transfer relay status (`enabled` or `disabled`).
    pub transfer: String,
    /// Destination chains the relay delivers to, in leg order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub relay_destinations: Vec<String>,
    /// Relay destinations that failed the readiness check.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unreachable_destinations: Vec<String>,
}

/// Simple health check response for liveness checks.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Health check endpoint handler.
///
/// A gateway without a relay still serves lookups, so a disabled relay is
/// reported but does not fail the check.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = ReadyResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let relay_destinations: Vec<String> = state
        .relay
        .as_ref()
        .map(|relay| {
            relay
                .executor()
                .legs()
                .iter()
                .map(|leg| leg.destination.key.to_string())
                .collect()
        })
        .unwrap_or_default();

    let response = ReadyResponse {
        status: "ok".to_string(),
        checks: HealthChecks {
            service: "ok".to_string(),
            signer: state.resolver.signer_address().to_checksum(None),
            identity_backend: state.identities().backend().to_string(),
            relay: if state.relay.is_some() { "enabled" } else { "disabled" }.to_string(),
            transfer: if state.transfer.is_some() { "enabled" } else { "disabled" }.to_string(),
            relay_destinations,
            unreachable_destinations: Vec::new(),
        },
    };

    (StatusCode::OK, Json(response))
}

/// Liveness handler.
///
/// Always returns 200 if the process is running.
/// Does not check dependencies - use readiness for that.
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Readiness handler.
///
/// When the relay is enabled, every destination chain must answer an RPC
/// call; otherwise the gateway reports 503 so deposits are not routed to it.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = ReadyResponse),
        (status = 503, description = "A relay destination is unreachable", body = ReadyResponse)
    )
)]
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let relay = state.relay.clone();
    let (_, Json(mut response)) = health(State(state)).await;

    if let Some(relay) = relay {
        let checks = relay
            .executor()
            .check_destinations(DESTINATION_CHECK_TIMEOUT)
            .await;
        for (leg, result) in checks {
            if let Err(e) = result {
                warn!(destination = leg.destination.key, error = %e, "Relay destination not ready");
                response
                    .checks
                    .unreachable_destinations
                    .push(leg.destination.key.to_string());
            }
        }
    }

    if response.checks.unreachable_destinations.is_empty() {
        (StatusCode::OK, Json(response))
    } else {
        response.status = "degraded".to_string();
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::{
        attestation::tests::ScriptedAttestations,
        executor::{default_legs, tests::FakeTransmitters},
        extractor::tests::StaticReceipts,
        AttestationPoller, DepositRelayEngine, RelayExecutor,
    };
    use crate::state::tests::test_state;
    use std::{collections::HashMap, sync::Arc};
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn health_reports_signer_and_disabled_relay() {
        let (status, Json(response)) = health(State(test_state())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response.checks.relay, "disabled");
        assert_eq!(response.checks.transfer, "disabled");
        assert_eq!(response.checks.identity_backend, "memory");
        assert_eq!(
            response.checks.signer,
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        );
        assert!(response.checks.relay_destinations.is_empty());
    }

    fn state_with_destinations(transmitters: FakeTransmitters) -> AppState {
        let poller = AttestationPoller::new(
            Arc::new(ScriptedAttestations::new(0)),
            CancellationToken::new(),
        );
        test_state().with_relay(DepositRelayEngine::new(
            Arc::new(StaticReceipts(HashMap::new())),
            poller,
            RelayExecutor::new(Arc::new(transmitters), default_legs()),
        ))
    }

    #[tokio::test]
    async fn readiness_without_relay_is_ok() {
        let (status, Json(response)) = readiness(State(test_state())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response.status, "ok");
    }

    #[tokio::test]
    async fn readiness_checks_relay_destinations() {
        let (status, Json(response)) =
            readiness(State(state_with_destinations(FakeTransmitters::default()))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            response.checks.relay_destinations,
            vec!["ethereum-sepolia", "base-sepolia"]
        );

        let (status, Json(response)) = readiness(State(state_with_destinations(
            FakeTransmitters::unreachable_on("base-sepolia"),
        )))
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.status, "degraded");
        assert_eq!(response.checks.unreachable_destinations, vec!["base-sepolia"]);

        // Liveness-style health stays green.
        let (status, _) = health(State(state_with_destinations(
            FakeTransmitters::unreachable_on("base-sepolia"),
        )))
        .await;
        assert_eq!(status, StatusCode::OK);
    }
}
