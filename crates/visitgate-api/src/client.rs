// Dashboard HTTP client
//
// Wraps `reqwest::Client` with base-URL joining, CSRF header injection and
// status/body decoding. Endpoint groups (analytics, check-in) are inherent
// methods in sibling modules so this file stays focused on transport.

use std::sync::{Arc, PoisonError, RwLock};

use reqwest::cookie::Jar;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::{AnalyticsQuery, ErrorBody};
use crate::transport::TransportConfig;

/// Header the backend's CSRF middleware reads on POST requests.
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Async client for the visitor dashboard backend.
///
/// One instance is shared by every chart panel and the check-in desk.
/// The CSRF token is optional: when set it rides on every POST.
pub struct DashboardClient {
    http: reqwest::Client,
    base_url: Url,
    csrf_token: RwLock<Option<SecretString>>,
    /// Cookie jar holding the login session, when the client owns one.
    cookie_jar: Option<Arc<Jar>>,
}

impl DashboardClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// A cookie jar is created if the config lacks one, so a session
    /// cookie can be installed later with [`set_session_cookie`](Self::set_session_cookie).
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let cookie_jar = config.cookie_jar.clone();
        let http = config.build_client()?;
        Ok(Self {
            http,
            base_url,
            csrf_token: RwLock::new(None),
            cookie_jar,
        })
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            csrf_token: RwLock::new(None),
            cookie_jar: None,
        }
    }

    /// The dashboard base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Session material ──────────────────────────────────────────────

    /// Store the CSRF token sent with every POST.
    pub fn set_csrf_token(&self, token: SecretString) {
        debug!("storing CSRF token");
        *self
            .csrf_token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    pub fn has_csrf_token(&self) -> bool {
        self.csrf_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Install a session cookie (`name=value`) for the base URL.
    ///
    /// Returns `false` when the client was built without a cookie jar.
    pub fn set_session_cookie(&self, cookie: &SecretString) -> bool {
        let Some(jar) = self.cookie_jar.as_ref() else {
            debug!("no cookie jar; session cookie ignored");
            return false;
        };
        jar.add_cookie_str(cookie.expose_secret(), &self.base_url);
        true
    }

    fn apply_csrf(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let guard = self.csrf_token.read().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            Some(token) => builder.header(CSRF_HEADER, token.expose_secret()),
            None => builder,
        }
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for a backend path such as `api/visitor_trend`.
    pub fn url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET with the analytics query string and decode the JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &AnalyticsQuery,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!(%url, ?query, "GET");

        let mut builder = self.http.get(url);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        let resp = builder.send().await?;

        Self::parse_json(resp).await
    }

    /// Send a POST with a JSON body (plus CSRF header) and decode the reply.
    pub(crate) async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!(%url, "POST");

        let builder = self.apply_csrf(self.http.post(url).json(body));
        let resp = builder.send().await?;

        Self::parse_json(resp).await
    }

    /// Map non-2xx statuses to errors, then decode the body as `T`.
    async fn parse_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        let body = resp.text().await?;
        trace!(%status, len = body.len(), "response received");

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message.or(b.error))
                .filter(|m| !m.is_empty());

            if status == reqwest::StatusCode::UNAUTHORIZED {
                return Err(Error::Authentication {
                    message: message.unwrap_or_else(|| "session expired or not logged in".into()),
                });
            }
            return Err(Error::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })
    }
}
