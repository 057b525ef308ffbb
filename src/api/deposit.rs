// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Deposit relay endpoint.

use axum::{extract::State, http::StatusCode, Json};
use tracing::info;

use super::ApiJson;
use crate::{
    error::{ApiError, ErrorBody},
    models::{DepositRelayRequest, DepositRelayResponse},
    relay::DepositRequest,
    state::AppState,
};

/// Relay the bridge messages emitted by a deposit transaction.
///
/// Blocks until every message has been attested and submitted, or has
/// failed. A failed message does not stop the others; the error response
/// then carries the per-message `outcomes`.
#[utoipa::path(
    post,
    path = "/v1/deposit",
    request_body = DepositRelayRequest,
    tag = "Deposits",
    responses(
        (status = 200, description = "All messages relayed or already processed", body = DepositRelayResponse),
        (status = 400, description = "Missing parameters or unsupported chain", body = ErrorBody),
        (status = 500, description = "Deposit processing failed", body = ErrorBody),
        (status = 503, description = "Relaying is not configured", body = ErrorBody)
    )
)]
pub async fn relay_deposit(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<DepositRelayRequest>,
) -> Result<Json<DepositRelayResponse>, ApiError> {
    let request =
        DepositRequest::parse(&body.deposit_tx_hash, &body.chain, body.require_messages)?;

    let relay = state.relay.as_ref().ok_or_else(|| {
        ApiError::service_unavailable("Deposit relay is not configured").with_kind("RELAY_DISABLED")
    })?;

    info!(tx_hash = %request.tx_hash, chain = request.source_chain.key, "Processing deposit");
    let report = relay.process_deposit(&request).await?;
    let response = DepositRelayResponse::from(&report);

    if let Some(failure) = report.first_failure() {
        return Err(
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Deposit processing failed")
                .with_kind(failure.kind())
                .with_details(failure.to_string())
                .with_outcomes(response.outcomes),
        );
    }

    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::transmitter::tests::message;
    use crate::relay::{
        attestation::tests::ScriptedAttestations,
        executor::{default_legs, tests::FakeTransmitters},
        extractor::tests::{message_sent_log, StaticReceipts},
        AttestationPoller, DepositRelayEngine, RelayExecutor,
    };
    use crate::state::tests::test_state;
    use alloy::primitives::B256;
    use std::{collections::HashMap, sync::Arc, time::Duration};
    use tokio_util::sync::CancellationToken;

    const DEPOSIT: B256 = B256::repeat_byte(0x42);

    fn state_with_relay(transmitters: FakeTransmitters) -> AppState {
        let logs = vec![
            message_sent_log(&message(6, 0, 1, b"vault")),
            message_sent_log(&message(6, 6, 2, b"telepay")),
        ];
        let engine = DepositRelayEngine::new(
            Arc::new(StaticReceipts(HashMap::from([(DEPOSIT, logs)]))),
            AttestationPoller::new(Arc::new(ScriptedAttestations::new(0)), CancellationToken::new())
                .with_limits(Duration::from_millis(1), 2),
            RelayExecutor::new(Arc::new(transmitters), default_legs()),
        );
        test_state().with_relay(engine)
    }

    fn body(chain: &str) -> DepositRelayRequest {
        DepositRelayRequest {
            deposit_tx_hash: format!("{DEPOSIT:#x}"),
            chain: chain.into(),
            require_messages: false,
        }
    }

    #[tokio::test]
    async fn relays_deposit_and_reports_both_legs() {
        let state = state_with_relay(FakeTransmitters::default());
        let Json(response) = relay_deposit(State(state), ApiJson(body("base-sepolia")))
            .await
            .unwrap();

        assert!(response.success);
        assert_eq!(response.message, "Processed 2 message(s)");
        assert_eq!(response.status, "processed");
        assert!(response.vault_tx.is_some());
        assert!(response.telepay_tx.is_some());
        assert_eq!(response.outcomes.len(), 2);
    }

    #[tokio::test]
    async fn failed_leg_is_500_with_outcomes() {
        let state = state_with_relay(FakeTransmitters::failing_on("base-sepolia"));
        let err = relay_deposit(State(state), ApiJson(body("base-sepolia")))
            .await
            .unwrap_err();

        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.kind, Some("RELAY_SUBMISSION_FAILED"));
        let outcomes = err.outcomes.unwrap();
        assert_eq!(outcomes[0].status, "relayed");
        assert_eq!(outcomes[1].status, "failed");
    }

    #[tokio::test]
    async fn unsupported_chain_is_bad_request() {
        let state = state_with_relay(FakeTransmitters::default());
        let err = relay_deposit(State(state), ApiJson(body("solana-devnet")))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_hash_is_bad_request() {
        let mut request = body("base-sepolia");
        request.deposit_tx_hash = String::new();
        let err = relay_deposit(State(test_state()), ApiJson(request))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Missing depositTxHash or chain");
    }

    #[tokio::test]
    async fn relay_disabled_is_service_unavailable() {
        let err = relay_deposit(State(test_state()), ApiJson(body("base-sepolia")))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
