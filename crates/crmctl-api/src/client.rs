// CRM REST HTTP client
//
// Wraps `reqwest::Client` with base-URL path construction, bearer-token
// injection, and `{ success, message, data }` envelope unwrapping. The
// endpoint families (resources, auth) are inherent methods in sibling
// files so this module stays focused on transport mechanics.

use std::sync::{PoisonError, RwLock};

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::envelope::{Envelope, ErrorBody};
use crate::error::Error;
use crate::transport::TransportConfig;

const BODY_PREVIEW_LEN: usize = 200;

/// Raw HTTP client for the CRM backend.
///
/// Verb helpers return the decoded envelope only after its `success` flag
/// and the HTTP status have been checked.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    /// Bearer token installed after login (or hydrated from a saved session).
    token: RwLock<Option<SecretString>>,
}

impl ApiClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the API root, e.g. `https://crm.example.com/api`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Wrap a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            token: RwLock::new(None),
        }
    }

    /// The API root URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Token management ─────────────────────────────────────────────

    /// Install or clear the bearer token.
    pub fn set_token(&self, token: Option<SecretString>) {
        debug!(present = token.is_some(), "updating bearer token");
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    pub fn has_token(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn apply_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let guard = self.token.read().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append percent-encoded path segments to the base URL.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
        params: &[(String, String)],
    ) -> Result<Envelope<T>, Error> {
        debug!("GET {url} params={params:?}");
        let resp = self.apply_auth(self.http.get(url)).query(params).send().await?;
        self.parse_envelope(resp).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync + ?Sized>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<Envelope<T>, Error> {
        debug!("POST {url}");
        let resp = self.apply_auth(self.http.post(url)).json(body).send().await?;
        self.parse_envelope(resp).await
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + Sync + ?Sized>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<Envelope<T>, Error> {
        debug!("PUT {url}");
        let resp = self.apply_auth(self.http.put(url)).json(body).send().await?;
        self.parse_envelope(resp).await
    }

    pub(crate) async fn delete(&self, url: Url) -> Result<Envelope<serde_json::Value>, Error> {
        debug!("DELETE {url}");
        let resp = self.apply_auth(self.http.delete(url)).send().await?;
        self.parse_envelope(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    /// Map HTTP status and envelope `success` into `Result`.
    async fn parse_envelope<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<Envelope<T>, Error> {
        let status = resp.status();
        let body = resp.text().await?;
        trace!(%status, len = body.len(), "response received");

        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        // An empty 2xx body (e.g. 204 on delete) is a bare success.
        if body.trim().is_empty() {
            return Ok(Envelope {
                success: true,
                message: None,
                data: None,
            });
        }

        let envelope: Envelope<T> = serde_json::from_str(&body).map_err(|e| {
            let preview = preview(&body);
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })?;

        if !envelope.success {
            return Err(Error::Api {
                status: status.as_u16(),
                message: envelope
                    .message
                    .unwrap_or_else(|| "request was not successful".into()),
            });
        }

        Ok(envelope)
    }
}

/// Unwrap `data`, failing if the server omitted it.
pub(crate) fn require_data<T>(envelope: Envelope<T>, what: &str) -> Result<T, Error> {
    envelope.data.ok_or_else(|| Error::Deserialization {
        message: format!("response for {what} carried no data"),
        body: String::new(),
    })
}

fn status_error(status: StatusCode, body: &str) -> Error {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(ErrorBody::into_message)
        .unwrap_or_else(|| {
            let preview = preview(body);
            if preview.is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_owned()
            } else {
                preview.to_owned()
            }
        });

    match status {
        StatusCode::UNAUTHORIZED => Error::Authentication { message },
        StatusCode::NOT_FOUND => Error::NotFound { message },
        StatusCode::UNPROCESSABLE_ENTITY => Error::Validation { message },
        _ => Error::Api {
            status: status.as_u16(),
            message,
        },
    }
}

fn preview(body: &str) -> &str {
    match body.char_indices().nth(BODY_PREVIEW_LEN) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
