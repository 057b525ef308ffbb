// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::FromRequest,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    error::{ApiError, ErrorBody},
    models::{
        CcipRequest, CcipResponse, CcipResponseData, DepositRelayRequest, DepositRelayResponse,
        Identity, LegOutcome, RegisterIdentityRequest, TransferAmount, TransferRelayRequest,
        TransferRelayResponse,
    },
    state::AppState,
};

pub mod ccip;
pub mod deposit;
pub mod health;
pub mod identities;
pub mod transfer;

/// `Json` extractor whose rejections use the API error body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/ccip", post(ccip::resolve))
        .route("/deposit", post(deposit::relay_deposit))
        .route("/transfer", post(transfer::relay_transfer))
        .route("/identities", post(identities::register_identity))
        .route("/identities/{username}", get(identities::get_identity));

    Router::new()
        .nest("/v1", v1_routes)
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        ccip::resolve,
        deposit::relay_deposit,
        transfer::relay_transfer,
        identities::get_identity,
        identities::register_identity,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            CcipRequest,
            CcipResponse,
            CcipResponseData,
            DepositRelayRequest,
            DepositRelayResponse,
            LegOutcome,
            TransferAmount,
            TransferRelayRequest,
            TransferRelayResponse,
            Identity,
            RegisterIdentityRequest,
            ErrorBody,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "CCIP", description = "CCIP-Read gateway for the Telepay resolver"),
        (name = "Deposits", description = "Cross-chain deposit relay"),
        (name = "Transfers", description = "Relayed Telepay transfers"),
        (name = "Identities", description = "Username registry"),
        (name = "Health", description = "Liveness and readiness checks")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ccip::{
        decoder::tests::{addr_call, resolve_calldata},
        dns,
    };
    use crate::state::tests::test_state;
    use alloy::hex;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    async fn send(request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = router(test_state()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or_default())
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let app = router(test_state());
        let _ = app.into_make_service();
    }

    #[tokio::test]
    async fn ccip_round_trip_over_http() {
        let name = "alice.telepay.cc";
        let (status, body) = send(post_json(
            "/v1/ccip",
            serde_json::json!({
                "name": hex::encode_prefixed(dns::encode(name).unwrap()),
                "data": hex::encode_prefixed(resolve_calldata(name, addr_call(name))),
                "sender": "0x2222222222222222222222222222222222222222",
            }),
        ))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["expires"], 1_700_003_600u64);
        assert!(body["data"]["signature"].as_str().unwrap().starts_with("0x"));
    }

    #[tokio::test]
    async fn ccip_missing_parameters_is_400_with_error_body() {
        let (status, body) = send(post_json("/v1/ccip", serde_json::json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required parameters");
        assert_eq!(body["type"], "MISSING_PARAMETER");
    }

    #[tokio::test]
    async fn unparseable_body_gets_error_body() {
        let request = Request::builder()
            .method("POST")
            .uri("/v1/deposit")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid request body");
        assert_eq!(body["type"], "INVALID_BODY");
        assert!(body["details"].is_string());

        let request = Request::builder()
            .method("POST")
            .uri("/v1/ccip")
            .body(Body::from("{}"))
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body["type"], "INVALID_BODY");
    }

    #[tokio::test]
    async fn identity_path_parameter_is_routed() {
        let request = Request::builder()
            .uri("/v1/identities/alice")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["publicKey"], "0x1111111111111111111111111111111111111111");
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        let request = Request::builder()
            .uri("/health/live")
            .body(Body::empty())
            .unwrap();
        let response = router(test_state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let request = Request::builder()
            .uri("/api-doc/openapi.json")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"].get("/v1/deposit").is_some());
        assert!(body["paths"].get("/v1/transfer").is_some());
    }
}
