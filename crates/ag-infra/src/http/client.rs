//! Shared REST plumbing: base URL, bearer token, error mapping.

use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use ag_core::ports::{ApiError, SessionPort};

/// Some endpoints wrap their payload in `{ "data": ... }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Body<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Body<T> {
    fn into_inner(self) -> T {
        match self {
            Body::Wrapped { data } => data,
            Body::Bare(value) => value,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// HTTP client for the marketplace REST API.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Arc<dyn SessionPort>,
}

impl ApiClient {
    /// `base_url` includes the `/api` prefix.
    pub fn new(base_url: &str, session: Arc<dyn SessionPort>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .build()
            .map_err(|err| ApiError::Network(err.to_string()))?;
        Ok(Self::with_client(client, base_url, session))
    }

    pub fn with_client(client: Client, base_url: &str, session: Arc<dyn SessionPort>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match self.session.bearer_token().await {
            Ok(Some(token)) => builder.bearer_auth(token),
            Ok(None) => builder,
            Err(err) => {
                warn!(error = %err, "session token unavailable, sending unauthenticated request");
                builder
            }
        }
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let builder = self.request(Method::GET, path).await;
        self.send(builder).await
    }

    pub(crate) async fn get_json_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let builder = self.request(Method::GET, path).await.query(query);
        self.send(builder).await
    }

    pub(crate) async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::POST, path).await.json(body);
        self.send(builder).await
    }

    pub(crate) async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::PUT, path).await.json(body);
        self.send(builder).await
    }

    /// Request whose response body is ignored.
    pub(crate) async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<(), ApiError> {
        let mut builder = self.request(method, path).await;
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = builder.send().await.map_err(transport_error)?;
        check_status(response).await.map(|_| ())
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = builder.send().await.map_err(transport_error)?;
        let response = check_status(response).await?;
        let bytes = response.bytes().await.map_err(transport_error)?;
        serde_json::from_slice::<Body<T>>(&bytes)
            .map(Body::into_inner)
            .map_err(|err| ApiError::Decode(err.to_string()))
    }
}

fn transport_error(err: reqwest::Error) -> ApiError {
    debug!(error = %err, "request failed before a response");
    ApiError::Network(err.to_string())
}

/// Passes successful responses through; turns the rest into
/// [`ApiError::Http`] carrying the body's `error` (or `message`) field.
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::UNAUTHORIZED {
        debug!("server rejected the session");
        return Err(ApiError::Unauthenticated);
    }

    let message = response
        .bytes()
        .await
        .ok()
        .and_then(|bytes| serde_json::from_slice::<ErrorBody>(&bytes).ok())
        .and_then(|body| body.error.or(body.message))
        .filter(|message| !message.trim().is_empty());

    Err(ApiError::Http {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Token(pub Option<&'static str>);

    #[async_trait]
    impl SessionPort for Token {
        fn is_signed_in(&self) -> bool {
            self.0.is_some()
        }

        async fn bearer_token(&self) -> anyhow::Result<Option<String>> {
            Ok(self.0.map(str::to_string))
        }
    }

    #[derive(Deserialize, Debug, PartialEq)]
    struct Ping {
        ok: bool,
    }

    #[tokio::test]
    async fn attaches_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/ping")
            .match_header("authorization", "Bearer abc")
            .with_header("content-type", "application/json")
            .with_body(r#"{"ok":true}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&format!("{}/api/", server.url()), Arc::new(Token(Some("abc"))))
            .unwrap();
        let ping: Ping = client.get_json("/ping").await.unwrap();

        assert_eq!(ping, Ping { ok: true });
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn unwraps_data_envelope() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/ping")
            .with_body(r#"{"data":{"ok":false}}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&format!("{}/api", server.url()), Arc::new(Token(None))).unwrap();
        let ping: Ping = client.get_json("ping").await.unwrap();

        assert_eq!(ping, Ping { ok: false });
    }

    #[tokio::test]
    async fn error_field_becomes_the_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/produce")
            .with_status(400)
            .with_body(r#"{"error":"At least one image is required"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&format!("{}/api", server.url()), Arc::new(Token(None))).unwrap();
        let err = client
            .post_json::<_, Ping>("produce", &serde_json::json!({}))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ApiError::Http {
                status: 400,
                message: Some("At least one image is required".into())
            }
        );
        assert_eq!(err.user_message(), "At least one image is required");
    }

    #[tokio::test]
    async fn unauthorized_maps_to_unauthenticated() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/users/me")
            .with_status(401)
            .with_body(r#"{"error":"Unauthorized"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&format!("{}/api", server.url()), Arc::new(Token(None))).unwrap();
        let err = client.get_json::<Ping>("users/me").await.unwrap_err();

        assert_eq!(err, ApiError::Unauthenticated);
    }

    #[tokio::test]
    async fn unreachable_server_is_a_network_error() {
        let client = ApiClient::new("http://127.0.0.1:9/api", Arc::new(Token(None))).unwrap();

        let err = client.get_json::<Ping>("ping").await.unwrap_err();

        assert!(matches!(err, ApiError::Network(_)));
        assert_eq!(err.user_message(), ag_core::ports::NETWORK_ERROR_MESSAGE);
    }
}
