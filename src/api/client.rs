//! HTTP client for the attendance backend.

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::auth::{extract_user_id, AuthProvider};
use super::{AttendanceApi, AttendanceRequest, Envelope};
use crate::error::{Error, Result};

/// Token locations the login endpoint has used across backend versions.
const TOKEN_PATHS: &[&[&str]] = &[&["token"], &["data", "token"], &["user", "token"]];
const USER_ID_PATHS: &[&[&str]] = &[
    &["userId"],
    &["id"],
    &["user", "id"],
    &["data", "userId"],
    &["data", "id"],
    &["data", "user", "id"],
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default, rename = "accountNumber")]
    pub account_number: Option<String>,
    #[serde(default, rename = "bankName")]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    /// Resolved from the response body, falling back to the token's claims.
    pub user_id: Option<String>,
}

pub struct ApiClient {
    http: Client,
    base_url: String,
    auth: AuthProvider,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, auth: AuthProvider) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("punchclock/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(Error::from)?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth,
        })
    }

    pub fn auth(&self) -> &AuthProvider {
        &self.auth
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        let builder = self.http.request(method, &url);
        match self.auth.token() {
            Some(token) => builder.bearer_auth(token),
            None => {
                warn!("no auth token present for {url}");
                builder
            }
        }
    }

    /// Send a request and hand back the parsed body. Non-2xx responses carry
    /// the status and body text; transport failures surface before any
    /// response exists.
    async fn execute(&self, builder: RequestBuilder) -> Result<Value> {
        let response = builder
            .send()
            .await
            .map_err(|err| Error::Transport(err.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| Error::Transport(err.to_string()))?;
        debug!("response {status}: {} bytes", body.len());

        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                body,
            });
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body)
            .map_err(|err| Error::ServerRejected(format!("malformed response body: {err}")))
    }

    /// `POST auth/login`. On success the token is stored in the injected
    /// [`AuthProvider`] so subsequent requests are signed.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome> {
        let url = format!("{}/auth/login", self.base_url);
        let body = json!({ "email": email, "password": password });
        let response = self
            .execute(self.http.post(&url).json(&body))
            .await?;

        let token = first_string_at(&response, TOKEN_PATHS)
            .ok_or_else(|| Error::ServerRejected("login response carried no token".to_string()))?;
        self.auth.set_token(&token);

        let user_id =
            first_string_at(&response, USER_ID_PATHS).or_else(|| extract_user_id(&token));
        if user_id.is_none() {
            warn!("login succeeded but no user id in response or token payload");
        }

        Ok(LoginOutcome { token, user_id })
    }

    /// Drop the stored token. Subsequent requests go out unsigned.
    pub fn logout(&self) {
        self.auth.clear();
    }

    pub async fn get_user(&self, id: &str) -> Result<User> {
        let response = self.execute(self.request(Method::GET, &format!("users/{id}"))).await?;
        unwrap_user(&response)
    }

    pub async fn update_user(&self, user: &User) -> Result<User> {
        let response = self
            .execute(self.request(Method::PUT, &format!("users/{}", user.id)).json(user))
            .await?;
        unwrap_user(&response)
    }

    pub async fn change_password(&self, old_password: &str, new_password: &str) -> Result<()> {
        let body = json!({
            "oldPassword": old_password,
            "newPassword": new_password,
        });
        self.execute(self.request(Method::POST, "users/change-password").json(&body))
            .await?;
        Ok(())
    }

    pub async fn upload_avatar(&self, id: &str, file_name: &str, bytes: Vec<u8>) -> Result<()> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("image/jpeg")
            .map_err(|err| Error::Transport(err.to_string()))?;
        let form = Form::new().part("image", part);
        self.execute(
            self.request(Method::POST, &format!("users/{id}/avatar"))
                .multipart(form),
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl AttendanceApi for ApiClient {
    async fn fetch_today(&self) -> Result<Value> {
        self.execute(self.request(Method::GET, "attendance/today")).await
    }

    async fn submit_attendance(&self, request: &AttendanceRequest) -> Result<Value> {
        self.execute(self.request(Method::POST, "attendance").json(request))
            .await
    }
}

fn unwrap_user(response: &Value) -> Result<User> {
    let envelope = Envelope::from_value(response);
    if !envelope.success {
        return Err(Error::ServerRejected(
            envelope
                .message
                .unwrap_or_else(|| "request failed".to_string()),
        ));
    }
    let data = envelope
        .data
        .ok_or_else(|| Error::ServerRejected("response carried no user".to_string()))?;
    serde_json::from_value(data)
        .map_err(|err| Error::ServerRejected(format!("malformed user payload: {err}")))
}

fn first_string_at(value: &Value, paths: &[&[&str]]) -> Option<String> {
    paths.iter().find_map(|path| {
        let mut current = value;
        for key in *path {
            current = current.get(key)?;
        }
        let raw = current.as_str()?.trim();
        (!raw.is_empty()).then(|| raw.to_string())
    })
}
