// src/api.rs
use gloo_net::http::{Request, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use urlencoding::encode;

use crate::catalog::Catalog;
use crate::error::ApiError;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub(crate) struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub(crate) struct LoginGrant {
    pub token: String,
    pub username: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub(crate) struct AuthStatus {
    pub authenticated: bool,
    #[serde(default)]
    pub username: Option<String>,
}

/// `{message}` body of a successful signup/unregister.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub(crate) struct Notice {
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<Value>,
}

/// The backend as the page sees it. `token` is the bearer credential, if any.
pub(crate) trait Backend {
    async fn activities(&self) -> Result<Catalog, ApiError>;
    async fn auth_status(&self, token: &str) -> Result<AuthStatus, ApiError>;
    async fn login(&self, credentials: &Credentials) -> Result<LoginGrant, ApiError>;
    async fn logout(&self, token: Option<&str>) -> Result<(), ApiError>;
    async fn signup(&self, token: Option<&str>, activity: &str, email: &str) -> Result<Notice, ApiError>;
    async fn unregister(&self, token: Option<&str>, activity: &str, email: &str) -> Result<Notice, ApiError>;
}

pub(crate) fn signup_path(activity: &str, email: &str) -> String {
    format!("/activities/{}/signup?email={}", encode(activity), encode(email))
}

pub(crate) fn unregister_path(activity: &str, email: &str) -> String {
    format!("/activities/{}/unregister?email={}", encode(activity), encode(email))
}

pub(crate) fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// Talks to the real server with `gloo-net`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct HttpBackend {
    base: String,
}

impl HttpBackend {
    pub(crate) fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }
}

fn authorized(req: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(t) => req.header("Authorization", &bearer(t)),
        None => req,
    }
}

/// 2xx bodies decode as `T`; anything else becomes `Rejected` with the server's `detail`.
async fn read<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    if resp.ok() {
        return Ok(resp.json::<T>().await?);
    }
    let status = resp.status();
    let body = resp.json::<ErrorBody>().await?;
    Err(ApiError::Rejected {
        status,
        detail: rejection_detail(body),
    })
}

// FastAPI validation errors send a list here; only a plain string is user-facing.
fn rejection_detail(body: ErrorBody) -> Option<String> {
    match body.detail {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

impl Backend for HttpBackend {
    async fn activities(&self) -> Result<Catalog, ApiError> {
        let resp = Request::get(&self.url("/activities")).send().await?;
        read(resp).await
    }

    async fn auth_status(&self, token: &str) -> Result<AuthStatus, ApiError> {
        let req = authorized(Request::get(&self.url("/auth/status")), Some(token));
        read(req.send().await?).await
    }

    async fn login(&self, credentials: &Credentials) -> Result<LoginGrant, ApiError> {
        let resp = Request::post(&self.url("/auth/login"))
            .json(credentials)?
            .send()
            .await?;
        read(resp).await
    }

    async fn logout(&self, token: Option<&str>) -> Result<(), ApiError> {
        let resp = authorized(Request::post(&self.url("/auth/logout")), token)
            .send()
            .await?;
        if resp.ok() {
            Ok(())
        } else {
            Err(ApiError::Rejected {
                status: resp.status(),
                detail: None,
            })
        }
    }

    async fn signup(&self, token: Option<&str>, activity: &str, email: &str) -> Result<Notice, ApiError> {
        let req = authorized(Request::post(&self.url(&signup_path(activity, email))), token);
        read(req.send().await?).await
    }

    async fn unregister(&self, token: Option<&str>, activity: &str, email: &str) -> Result<Notice, ApiError> {
        let req = authorized(Request::delete(&self.url(&unregister_path(activity, email))), token);
        read(req.send().await?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_and_emails_are_percent_encoded() {
        assert_eq!(
            signup_path("Chess Club", "a+b@x.com"),
            "/activities/Chess%20Club/signup?email=a%2Bb%40x.com"
        );
        assert_eq!(
            unregister_path("Art & Craft/2", "kid@school.edu"),
            "/activities/Art%20%26%20Craft%2F2/unregister?email=kid%40school.edu"
        );
    }

    #[test]
    fn base_url_is_joined_without_double_slash() {
        let backend = HttpBackend::new("https://school.example/");
        assert_eq!(backend.url("/activities"), "https://school.example/activities");
        assert_eq!(HttpBackend::new("").url("/auth/status"), "/auth/status");
    }

    #[test]
    fn bearer_header_value() {
        assert_eq!(bearer("abc123"), "Bearer abc123");
    }

    #[test]
    fn only_string_details_are_kept() {
        let body: ErrorBody = serde_json::from_str(r#"{"detail": "Activity is full"}"#).unwrap();
        assert_eq!(rejection_detail(body), Some("Activity is full".to_string()));

        let body: ErrorBody =
            serde_json::from_str(r#"{"detail": [{"loc": ["query", "email"], "msg": "field required"}]}"#).unwrap();
        assert_eq!(rejection_detail(body), None);

        let body: ErrorBody = serde_json::from_str("{}").unwrap();
        assert_eq!(rejection_detail(body), None);
    }

    #[test]
    fn status_without_username_parses() {
        let status: AuthStatus = serde_json::from_str(r#"{"authenticated": false}"#).unwrap();
        assert_eq!(
            status,
            AuthStatus {
                authenticated: false,
                username: None
            }
        );
    }
}
