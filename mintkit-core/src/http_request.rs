use std::time::Duration;

use reqwest::{RequestBuilder, Response, Url};
use serde::Serialize;
use url::Host;

use crate::error::MintKitError;

/// A simple wrapper on an HTTP client for making requests. Sets sensible defaults such as
/// timeouts, user-agent & ensuring HTTPS for anything but loopback hosts. Failed requests
/// are not retried.
pub(crate) struct Request {
    client: reqwest::Client,
    timeout: Duration,
}

impl Request {
    /// Initializes a new `Request` instance.
    pub(crate) fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }

    /// Creates a POST request builder with a JSON body and defaults applied.
    pub(crate) fn post_json<T>(
        &self,
        url: &str,
        body: &T,
    ) -> Result<RequestBuilder, MintKitError>
    where
        T: Serialize + ?Sized,
    {
        let parsed = Url::parse(url).map_err(|e| MintKitError::InvalidInput {
            attribute: "url".to_string(),
            reason: e.to_string(),
        })?;
        ensure_secure_url("url", &parsed)?;

        Ok(self
            .client
            .post(parsed)
            .timeout(self.timeout)
            .header(
                "User-Agent",
                format!("mintkit-core/{}", env!("CARGO_PKG_VERSION")),
            )
            .json(body))
    }

    /// Sends a request built by `post_json`, turning non-success statuses into errors.
    pub(crate) async fn handle(
        &self,
        request_builder: RequestBuilder,
    ) -> Result<Response, MintKitError> {
        let (client, request) = request_builder.build_split();
        let request = request?;
        let url = request.url().to_string();

        let response = client.execute(request).await.map_err(|err| {
            MintKitError::NetworkError {
                url: url.clone(),
                status: None,
                error: format!("request failed: {err}"),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("Unknown error"));
            return Err(MintKitError::NetworkError {
                url,
                status: Some(status.as_u16()),
                error,
            });
        }

        Ok(response)
    }
}

/// Accepts `https` URLs, and plain `http` only for loopback hosts.
pub(crate) fn ensure_secure_url(attribute: &str, url: &Url) -> Result<(), MintKitError> {
    match url.scheme() {
        "https" => Ok(()),
        "http" if is_loopback(url) => Ok(()),
        "http" => Err(MintKitError::InvalidInput {
            attribute: attribute.to_string(),
            reason: "plain http is only allowed for loopback hosts".to_string(),
        }),
        scheme => Err(MintKitError::InvalidInput {
            attribute: attribute.to_string(),
            reason: format!("unsupported scheme {scheme}"),
        }),
    }
}

fn is_loopback(url: &Url) -> bool {
    match url.host() {
        Some(Host::Domain(domain)) => domain == "localhost",
        Some(Host::Ipv4(ip)) => ip.is_loopback(),
        Some(Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}
