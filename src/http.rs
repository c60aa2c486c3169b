//! HTTP GET with manual, bounded redirect following
//!
//! GitHub answers both release pages and asset downloads with one or more
//! redirects. Rather than trusting the client's automatic redirect handling,
//! [`follow`] walks them itself so the number of requests per URL is capped
//! (see [`MAX_REQUESTS`](crate::constants::MAX_REQUESTS)). Each response is
//! classified into a [`Hop`]:
//!
//! - `200` → [`Hop::Located`], the response is returned
//! - `300..=399` → [`Hop::Redirect`], the next request goes to `Location`
//! - anything else → [`Hop::NotYetLocated`], the same URL is requested again
//!
//! Transport goes through the [`HttpClient`] trait; [`ReqwestClient`] is the
//! production implementation.

use crate::core::InstallerError;
use anyhow::{Context, Result};
use reqwest::Url;
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use std::time::Duration;
use tracing::debug;

/// A fully buffered HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub location: Option<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            location: None,
            body: body.into(),
        }
    }

    pub fn redirect(location: impl Into<String>) -> Self {
        Self {
            status: 302,
            location: Some(location.into()),
            body: Vec::new(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            location: None,
            body: Vec::new(),
        }
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Issues a single GET without following redirects.
#[allow(async_fn_in_trait)]
pub trait HttpClient {
    async fn get(&self, url: &Url) -> Result<HttpResponse>;
}

/// [`HttpClient`] backed by `reqwest` with automatic redirects disabled.
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .timeout(timeout)
            .user_agent(concat!("deno-installer/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
        })
    }
}

impl HttpClient for ReqwestClient {
    async fn get(&self, url: &Url) -> Result<HttpResponse> {
        let network_error = |e: reqwest::Error| InstallerError::Network {
            operation: format!("fetching {url}"),
            reason: e.to_string(),
        };

        let response = self.client.get(url.clone()).send().await.map_err(network_error)?;
        let status = response.status().as_u16();
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let body = if (300..400).contains(&status) {
            Vec::new()
        } else {
            response.bytes().await.map_err(network_error)?.to_vec()
        };

        Ok(HttpResponse {
            status,
            location,
            body,
        })
    }
}

/// Classification of one response while following a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hop {
    Located,
    Redirect(Url),
    NotYetLocated(u16),
}

/// Decide what to do with `response`, received for `current`.
///
/// Relative `Location` values are resolved against `current`.
pub fn classify(response: &HttpResponse, current: &Url) -> Result<Hop, InstallerError> {
    match response.status {
        200 => Ok(Hop::Located),
        300..=399 => {
            let location =
                response.location.as_deref().ok_or_else(|| InstallerError::Network {
                    operation: format!("following redirect from {current}"),
                    reason: format!("status {} without a Location header", response.status),
                })?;
            let next = current.join(location).map_err(|e| InstallerError::Network {
                operation: format!("following redirect from {current}"),
                reason: format!("invalid Location {location:?}: {e}"),
            })?;
            Ok(Hop::Redirect(next))
        }
        other => Ok(Hop::NotYetLocated(other)),
    }
}

/// GET `url`, following redirects, until a `200` arrives.
///
/// At most `max_requests` requests are issued in total; when the budget runs
/// out the call fails with [`InstallerError::UrlUnresolvable`].
pub async fn follow<C: HttpClient>(client: &C, url: &str, max_requests: u32) -> Result<HttpResponse> {
    let mut current = Url::parse(url).map_err(|e| InstallerError::Network {
        operation: format!("parsing {url}"),
        reason: e.to_string(),
    })?;

    for attempt in 1..=max_requests {
        debug!("GET {current} (request {attempt}/{max_requests})");
        let response = client.get(&current).await?;

        match classify(&response, &current)? {
            Hop::Located => return Ok(response),
            Hop::Redirect(next) => {
                debug!("{} redirect to {next}", response.status);
                current = next;
            }
            Hop::NotYetLocated(status) => {
                debug!("{current} answered {status}, retrying");
            }
        }
    }

    Err(InstallerError::UrlUnresolvable {
        url: url.to_string(),
        attempts: max_requests,
    }
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::ScriptedClient;

    #[test]
    fn test_classify() {
        let base = Url::parse("https://example.test/releases/latest").unwrap();

        assert_eq!(classify(&HttpResponse::ok("body"), &base).unwrap(), Hop::Located);
        assert_eq!(
            classify(&HttpResponse::redirect("/releases/tag/v1.0.0"), &base).unwrap(),
            Hop::Redirect(Url::parse("https://example.test/releases/tag/v1.0.0").unwrap())
        );
        assert_eq!(
            classify(&HttpResponse::redirect("https://cdn.test/x"), &base).unwrap(),
            Hop::Redirect(Url::parse("https://cdn.test/x").unwrap())
        );
        assert_eq!(classify(&HttpResponse::status(404), &base).unwrap(), Hop::NotYetLocated(404));
        assert!(classify(&HttpResponse::status(301), &base).is_err());
    }

    #[tokio::test]
    async fn test_three_redirects_then_ok() {
        let client = ScriptedClient::new()
            .route("https://a.test/0", HttpResponse::redirect("https://a.test/1"))
            .route("https://a.test/1", HttpResponse::redirect("https://a.test/2"))
            .route("https://a.test/2", HttpResponse::redirect("https://a.test/3"))
            .route("https://a.test/3", HttpResponse::ok("done"));

        let response = follow(&client, "https://a.test/0", 4).await.unwrap();
        assert_eq!(response.text(), "done");
        assert_eq!(client.requests().len(), 4);
    }

    #[tokio::test]
    async fn test_four_redirects_fail_without_fifth_request() {
        let client = ScriptedClient::new()
            .route("https://a.test/0", HttpResponse::redirect("https://a.test/1"))
            .route("https://a.test/1", HttpResponse::redirect("https://a.test/2"))
            .route("https://a.test/2", HttpResponse::redirect("https://a.test/3"))
            .route("https://a.test/3", HttpResponse::redirect("https://a.test/4"))
            .route("https://a.test/4", HttpResponse::ok("never reached"));

        let err = follow(&client, "https://a.test/0", 4).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<InstallerError>(),
            Some(&InstallerError::UrlUnresolvable {
                url: "https://a.test/0".to_string(),
                attempts: 4
            })
        );
        assert_eq!(
            client.requests(),
            vec!["https://a.test/0", "https://a.test/1", "https://a.test/2", "https://a.test/3"]
        );
    }

    #[tokio::test]
    async fn test_non_ok_status_is_retried() {
        let client = ScriptedClient::new().route_sequence(
            "https://a.test/page",
            vec![HttpResponse::status(503), HttpResponse::ok("ready")],
        );

        let response = follow(&client, "https://a.test/page", 4).await.unwrap();
        assert_eq!(response.text(), "ready");
        assert_eq!(client.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_persistent_error_status_exhausts_budget() {
        let client = ScriptedClient::new().route("https://a.test/page", HttpResponse::status(500));

        assert!(follow(&client, "https://a.test/page", 3).await.is_err());
        assert_eq!(client.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let client = ScriptedClient::new();
        let err = follow(&client, "not a url", 4).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<InstallerError>(),
            Some(InstallerError::Network { .. })
        ));
        assert!(client.requests().is_empty());
    }
}
