//! JSON client for upstream version catalogs.

use anyhow::Result;
use log::debug;
use reqwest::{Client, StatusCode};
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;

use super::status::describe_failure;
use crate::error::PackError;

/// Thin wrapper over [`reqwest::Client`] that turns every failure into
/// [`PackError::UpstreamFetchFailure`]. Requests are attempted once.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    headers: HeaderMap,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            headers: HeaderMap::new(),
        }
    }

    /// Same connection pool, extra headers on every request made through the copy.
    pub fn with_headers(&self, headers: HeaderMap) -> Self {
        let mut merged = self.headers.clone();
        merged.extend(headers);
        Self {
            client: self.client.clone(),
            headers: merged,
        }
    }

    /// Performs a GET request and deserializes the JSON response.
    #[tracing::instrument(skip(self))]
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.get_json_with_query(url, &[]).await
    }

    /// Performs a GET request with query parameters and deserializes the JSON response.
    #[tracing::instrument(skip(self, query))]
    pub async fn get_json_with_query<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        debug!("GET JSON from {} with query {:?}...", url, query);

        let fail = |e: reqwest::Error| PackError::UpstreamFetchFailure {
            url: url.to_string(),
            reason: describe_failure(&e),
        };

        let mut request = self.client.get(url).headers(self.headers.clone());
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request.send().await.map_err(fail)?;
        let response = response.error_for_status().map_err(fail)?;
        let result = response.json::<T>().await.map_err(fail)?;

        Ok(result)
    }

    /// Like [`HttpClient::get_json`], but a 404 yields `None` instead of an error.
    #[tracing::instrument(skip(self))]
    pub async fn get_optional_json<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>> {
        debug!("GET JSON from {} (404 allowed)...", url);

        let fail = |e: reqwest::Error| PackError::UpstreamFetchFailure {
            url: url.to_string(),
            reason: describe_failure(&e),
        };

        let response = self
            .client
            .get(url)
            .headers(self.headers.clone())
            .send()
            .await
            .map_err(fail)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = response.error_for_status().map_err(fail)?;
        let result = response.json::<T>().await.map_err(fail)?;

        Ok(Some(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::pack_error;
    use reqwest::header::HeaderValue;

    #[derive(serde::Deserialize, Debug, PartialEq)]
    struct TestResponse {
        name: String,
        value: i32,
    }

    #[tokio::test]
    async fn test_get_json_success() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/test")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"name": "test", "value": 42}"#)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let result: TestResponse = client.get_json(&format!("{}/test", url)).await.unwrap();

        mock.assert_async().await;
        assert_eq!(result.name, "test");
        assert_eq!(result.value, 42);
    }

    #[tokio::test]
    async fn test_get_json_not_found_is_upstream_failure() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/test")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let err = client
            .get_json::<serde_json::Value>(&format!("{}/test", url))
            .await
            .unwrap_err();

        // One attempt only
        mock.assert_async().await;
        match pack_error(&err) {
            Some(PackError::UpstreamFetchFailure { url: failed, reason }) => {
                assert!(failed.ends_with("/test"));
                assert!(reason.contains("not found"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_json_server_error_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/test")
            .with_status(500)
            .expect(1)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let result = client
            .get_json::<serde_json::Value>(&format!("{}/test", url))
            .await;

        mock.assert_async().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_get_json_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let _mock = server
            .mock("GET", "/test")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let err = client
            .get_json::<TestResponse>(&format!("{}/test", url))
            .await
            .unwrap_err();

        assert!(matches!(
            pack_error(&err),
            Some(PackError::UpstreamFetchFailure { .. })
        ));
    }

    #[tokio::test]
    async fn test_get_json_with_query_success() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/test?page=1&per_page=10")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"["item1", "item2"]"#)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let result: Vec<String> = client
            .get_json_with_query(
                &format!("{}/test", url),
                &[("page", "1"), ("per_page", "10")],
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result, vec!["item1", "item2"]);
    }

    #[tokio::test]
    async fn test_get_optional_json_not_found_is_none() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let _missing = server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;
        let _present = server
            .mock("GET", "/present")
            .with_status(200)
            .with_body(r#"{"name": "x", "value": 1}"#)
            .create_async()
            .await;
        let _broken = server
            .mock("GET", "/broken")
            .with_status(500)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let missing: Option<TestResponse> = client
            .get_optional_json(&format!("{}/missing", url))
            .await
            .unwrap();
        assert!(missing.is_none());

        let present: Option<TestResponse> = client
            .get_optional_json(&format!("{}/present", url))
            .await
            .unwrap();
        assert_eq!(present.unwrap().value, 1);

        let broken = client
            .get_optional_json::<TestResponse>(&format!("{}/broken", url))
            .await;
        assert!(broken.is_err());
    }

    #[tokio::test]
    async fn test_with_headers_sends_extra_headers() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/mods")
            .match_header("x-api-key", "secret")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_static("secret"));
        let client = HttpClient::new(Client::new()).with_headers(headers);

        let result: Vec<String> = client.get_json(&format!("{}/mods", url)).await.unwrap();

        mock.assert_async().await;
        assert!(result.is_empty());
    }
}
