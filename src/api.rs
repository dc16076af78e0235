//! HTTP client for the persistence and auth endpoints.
//!
//! The server holds one game-state row per user behind bearer-token
//! authentication:
//!
//! - `POST /api/register`, `POST /api/login`, `GET /api/me`
//! - `GET  /api/game/load` → `{ currency, upgrades }`
//! - `PUT  /api/game/save` ← `{ currency, upgrades }`
//!
//! Save calls are fire-and-forget at the call sites: a failed save is
//! only logged, and the next debounce/heartbeat attempt retries with the
//! latest snapshot. [`flush_save`] additionally marks its request
//! keepalive so a save dispatched from `beforeunload` can outlive the
//! page.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::save::Snapshot;

/// Fallback endpoint for local development; override with a
/// `data-api-base` attribute on `<body>`.
const DEFAULT_API_BASE: &str = "http://localhost:3333";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network request failed: {0}")]
    Network(String),
    #[error("invalid e-mail or password")]
    Unauthorized,
    #[error("this e-mail is already in use")]
    EmailInUse,
    #[error("no saved game for this user")]
    NotFound,
    #[error("{0}")]
    Invalid(String),
    #[error("unexpected response (status {status})")]
    Unexpected { status: u16 },
}

#[derive(Debug, Serialize)]
pub struct LoginBody<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RegisterBody<'a> {
    pub email: &'a str,
    pub password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

/// Identity of the bearer token's owner, resolved after login. The
/// server echoes the token claims, so the user id arrives as `sub`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct MeResponse {
    #[serde(rename = "sub")]
    pub user_id: String,
    pub username: String,
}

/// Server error payloads carry a human-readable `message`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorBody {
    message: String,
}

fn error_for_status(status: u16, body: &str) -> ApiError {
    match status {
        401 => ApiError::Unauthorized,
        404 => ApiError::NotFound,
        409 => ApiError::EmailInUse,
        400 => {
            let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
            if parsed.message.is_empty() {
                ApiError::Invalid("invalid request".to_string())
            } else {
                ApiError::Invalid(parsed.message)
            }
        }
        status => ApiError::Unexpected { status },
    }
}

mod fetch {
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{Headers, Request, RequestInit, Response};

    use super::*;

    /// Resolve the endpoint base URL from `<body data-api-base="…">`,
    /// falling back to the local default.
    pub fn api_base() -> String {
        web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.body())
            .and_then(|b| b.get_attribute("data-api-base"))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
    }

    fn js_err(v: JsValue) -> ApiError {
        ApiError::Network(format!("{:?}", v))
    }

    fn build_request(
        method: &str,
        path: &str,
        bearer: Option<&str>,
        body: Option<String>,
        keepalive: bool,
    ) -> Result<Request, ApiError> {
        let opts = RequestInit::new();
        opts.set_method(method);
        if keepalive {
            opts.set_keepalive(true);
        }

        let headers = Headers::new().map_err(js_err)?;
        if body.is_some() {
            headers
                .set("Content-Type", "application/json")
                .map_err(js_err)?;
        }
        if let Some(token) = bearer {
            headers
                .set("Authorization", &format!("Bearer {}", token))
                .map_err(js_err)?;
        }
        opts.set_headers(&headers);
        if let Some(body) = body {
            opts.set_body(&JsValue::from_str(&body));
        }

        let url = format!("{}{}", api_base(), path);
        Request::new_with_str_and_init(&url, &opts).map_err(js_err)
    }

    /// Perform a request and hand back `(status, body_text)`.
    pub async fn request(
        method: &str,
        path: &str,
        bearer: Option<&str>,
        body: Option<String>,
    ) -> Result<(u16, String), ApiError> {
        let window = web_sys::window().ok_or_else(|| {
            ApiError::Network("no window".to_string())
        })?;
        let request = build_request(method, path, bearer, body, false)?;
        let response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(js_err)?;
        let response: Response = response.dyn_into().map_err(js_err)?;
        let status = response.status();
        let text = JsFuture::from(response.text().map_err(js_err)?)
            .await
            .map_err(js_err)?
            .as_string()
            .unwrap_or_default();
        Ok((status, text))
    }

    /// Dispatch a request without awaiting it, marked keepalive so the
    /// browser lets it finish after page teardown.
    pub fn dispatch_keepalive(
        method: &str,
        path: &str,
        bearer: Option<&str>,
        body: Option<String>,
    ) {
        let window = match web_sys::window() {
            Some(w) => w,
            None => return,
        };
        if let Ok(request) = build_request(method, path, bearer, body, true) {
            // Intentionally not awaited; errors here are unobservable.
            let _ = window.fetch_with_request(&request);
        }
    }
}

/// Load the authenticated user's saved game.
pub async fn load_game(token: &str) -> Result<Snapshot, ApiError> {
    let (status, body) = fetch::request("GET", "/api/game/load", Some(token), None).await?;
    if status == 200 {
        serde_json::from_str(&body).map_err(|e| ApiError::Network(e.to_string()))
    } else {
        Err(error_for_status(status, &body))
    }
}

/// Persist a full snapshot for the authenticated user.
pub async fn save_game(token: &str, snapshot: &Snapshot) -> Result<(), ApiError> {
    let body = serde_json::to_string(snapshot)
        .map_err(|e| ApiError::Network(e.to_string()))?;
    let (status, body) =
        fetch::request("PUT", "/api/game/save", Some(token), Some(body)).await?;
    if status == 200 {
        Ok(())
    } else {
        Err(error_for_status(status, &body))
    }
}

/// Best-effort save that survives page teardown. Fire-and-forget.
pub fn flush_save(token: &str, snapshot: &Snapshot) {
    if let Ok(body) = serde_json::to_string(snapshot) {
        fetch::dispatch_keepalive("PUT", "/api/game/save", Some(token), Some(body));
    }
}

/// Exchange credentials for a bearer token.
pub async fn login(email: &str, password: &str) -> Result<String, ApiError> {
    let body = serde_json::to_string(&LoginBody { email, password })
        .map_err(|e| ApiError::Network(e.to_string()))?;
    let (status, body) = fetch::request("POST", "/api/login", None, Some(body)).await?;
    if status == 200 {
        let parsed: TokenResponse =
            serde_json::from_str(&body).map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(parsed.token)
    } else {
        Err(error_for_status(status, &body))
    }
}

/// Create an account (the server seeds an empty game state with it).
pub async fn register(
    email: &str,
    password: &str,
    username: Option<&str>,
) -> Result<(), ApiError> {
    let body = serde_json::to_string(&RegisterBody {
        email,
        password,
        username,
    })
    .map_err(|e| ApiError::Network(e.to_string()))?;
    let (status, body) = fetch::request("POST", "/api/register", None, Some(body)).await?;
    if status == 201 {
        Ok(())
    } else {
        Err(error_for_status(status, &body))
    }
}

/// Resolve the token owner's id and name.
pub async fn me(token: &str) -> Result<MeResponse, ApiError> {
    let (status, body) = fetch::request("GET", "/api/me", Some(token), None).await?;
    if status == 200 {
        serde_json::from_str(&body).map_err(|e| ApiError::Network(e.to_string()))
    } else {
        Err(error_for_status(status, &body))
    }
}
