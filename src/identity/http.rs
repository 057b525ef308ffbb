// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identity lookups against an external user service.
//!
//! `GET {base}/users/{username}` returns `{ "username", "publicKey" }` or 404.
//! A user without a `publicKey` is treated as not found.

use std::time::Duration;

use alloy::primitives::Address;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;

use super::{IdentityRecord, IdentityStore, IdentityStoreError};

#[derive(Debug, Clone)]
pub struct HttpIdentityStore {
    base_url: Url,
    http: Client,
}

/// User-lookup response body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupResponse {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    public_key: Option<Address>,
}

impl HttpIdentityStore {
    pub fn new(base_url: impl Into<String>) -> Result<Self, IdentityStoreError> {
        let raw = base_url.into();
        let base_url = Url::parse(&raw)
            .map_err(|e| IdentityStoreError::Backend(format!("invalid identity API URL `{raw}`: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(IdentityStoreError::Backend(format!(
                "identity API URL `{raw}` cannot carry a path"
            )));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| IdentityStoreError::Backend(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { base_url, http })
    }

    /// `{base}/users/{username}` with the username as one percent-encoded segment.
    fn lookup_url(&self, username: &str) -> Result<Url, IdentityStoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| IdentityStoreError::Backend("identity API URL cannot carry a path".into()))?
            .pop_if_empty()
            .push("users")
            .push(username);
        Ok(url)
    }
}

#[async_trait]
impl IdentityStore for HttpIdentityStore {
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<IdentityRecord>, IdentityStoreError> {
        // `push` silently drops dot segments, which would turn this into a
        // lookup of `/users` itself.
        if username.is_empty() || username == "." || username == ".." {
            return Ok(None);
        }

        let url = self.lookup_url(username)?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| IdentityStoreError::Backend(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let body = response.json::<LookupResponse>().await.map_err(|e| {
                    IdentityStoreError::Backend(format!("invalid lookup response: {e}"))
                })?;
                Ok(body.public_key.map(|public_key| IdentityRecord {
                    username: body.username.unwrap_or_else(|| username.to_string()),
                    public_key,
                }))
            }
            status => Err(IdentityStoreError::Backend(format!(
                "lookup for `{username}` returned {status}"
            ))),
        }
    }

    fn backend(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;
    use wiremock::{
        matchers::{method, path, path_regex},
        Mock, MockServer, ResponseTemplate,
    };

    #[tokio::test]
    async fn found_user_is_decoded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/alice"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "username": "alice",
                "publicKey": "0x1111111111111111111111111111111111111111"
            })))
            .mount(&server)
            .await;

        let store = HttpIdentityStore::new(format!("{}/", server.uri())).unwrap();
        let record = store.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(
            record.public_key,
            address!("1111111111111111111111111111111111111111")
        );
    }

    #[tokio::test]
    async fn missing_user_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/nobody"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let store = HttpIdentityStore::new(server.uri()).unwrap();
        assert!(store.find_by_username("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn user_without_public_key_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/alice"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "username": "alice",
                "publicKey": null
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users/bob"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "username": "bob" })),
            )
            .mount(&server)
            .await;

        let store = HttpIdentityStore::new(server.uri()).unwrap();
        assert!(store.find_by_username("alice").await.unwrap().is_none());
        assert!(store.find_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn username_cannot_escape_users_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "username": "admin",
                "publicKey": "0x9999999999999999999999999999999999999999"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/api/users/[^/]+$"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let store = HttpIdentityStore::new(format!("{}/api", server.uri())).unwrap();
        assert!(store.find_by_username("a/../../../admin").await.unwrap().is_none());
        assert!(store.find_by_username("..").await.unwrap().is_none());

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].url.path().starts_with("/api/users/"));
    }

    #[test]
    fn lookup_url_keeps_base_path_and_encodes_username() {
        let store = HttpIdentityStore::new("https://users.example/v2/").unwrap();
        assert_eq!(
            store.lookup_url("a/b?c#d").unwrap().as_str(),
            "https://users.example/v2/users/a%2Fb%3Fc%23d"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(HttpIdentityStore::new("not a url").is_err());
    }

    #[tokio::test]
    async fn server_error_is_backend_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let store = HttpIdentityStore::new(server.uri()).unwrap();
        assert!(matches!(
            store.find_by_username("alice").await,
            Err(IdentityStoreError::Backend(_))
        ));
    }

    #[tokio::test]
    async fn registration_is_read_only() {
        let store = HttpIdentityStore::new("http://localhost:1").unwrap();
        let err = store
            .register(IdentityRecord {
                username: "alice".into(),
                public_key: address!("1111111111111111111111111111111111111111"),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityStoreError::ReadOnly));
    }
}
