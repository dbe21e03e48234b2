//! REST backend implementation.

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{
    Backend, BackendError, BackendList, BackendTask, ChangePasswordArgs, CreateTaskArgs, Credentials, ListArgs, Profile,
    RegisterArgs, UpdateTaskArgs,
};
use crate::config::ServerConfig;

#[derive(Deserialize)]
struct TokenResponse {
    auth_token: String,
}

/// Backend speaking the token-authenticated JSON REST API.
pub struct RestBackend {
    client: Client,
    base_url: Url,
}

impl RestBackend {
    /// Create a backend for the configured server.
    pub fn new(config: &ServerConfig) -> anyhow::Result<Self> {
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base).map_err(|e| anyhow::anyhow!("Invalid base_url '{}': {}", base, e))?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str) -> Result<Url, BackendError> {
        self.base_url
            .join(path)
            .map_err(|e| BackendError::InvalidData(format!("Invalid endpoint '{}': {}", path, e)))
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> Result<RequestBuilder, BackendError> {
        let mut builder = self
            .client
            .request(method, self.url(path)?)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(reqwest::header::AUTHORIZATION, format!("Token {}", token));
        }
        Ok(builder)
    }

    /// Send a request and map transport failures and non-success statuses.
    async fn send(&self, builder: RequestBuilder) -> Result<Response, BackendError> {
        let response = builder.send().await.map_err(|e| {
            warn!("🌐 Request failed: {}", e);
            BackendError::Network(e.to_string())
        })?;

        let status = response.status();
        debug!("🌐 {} {}", status.as_u16(), response.url());

        if status.is_success() {
            Ok(response)
        } else {
            Err(BackendError::from_status(status.as_u16()))
        }
    }

    async fn json<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::InvalidData(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, token: &str) -> Result<T, BackendError> {
        let response = self.send(self.request(Method::GET, path, Some(token))?).await?;
        Self::json(response).await
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, token: Option<&str>, body: &B) -> Result<T, BackendError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self.send(self.request(method, path, token)?.json(body)).await?;
        Self::json(response).await
    }

    async fn send_empty(&self, method: Method, path: &str, token: &str) -> Result<(), BackendError> {
        self.send(self.request(method, path, Some(token))?).await?;
        Ok(())
    }
}

#[async_trait]
impl Backend for RestBackend {
    fn backend_type(&self) -> &str {
        "rest"
    }

    async fn register(&self, args: &RegisterArgs) -> Result<Profile, BackendError> {
        self.send_json(Method::POST, "auth/users/", None, args).await
    }

    async fn log_in(&self, credentials: &Credentials) -> Result<String, BackendError> {
        let response: TokenResponse = self
            .send_json(Method::POST, "auth/token/login/", None, credentials)
            .await?;
        Ok(response.auth_token)
    }

    async fn log_out(&self, token: &str) -> Result<(), BackendError> {
        self.send_empty(Method::POST, "auth/token/logout/", token).await
    }

    async fn fetch_profile(&self, token: &str) -> Result<Profile, BackendError> {
        self.get("auth/users/me/", token).await
    }

    async fn change_password(&self, token: &str, args: &ChangePasswordArgs) -> Result<(), BackendError> {
        let request = self.request(Method::POST, "auth/users/set_password/", Some(token))?.json(args);
        self.send(request).await?;
        Ok(())
    }

    async fn fetch_lists(&self, token: &str) -> Result<Vec<BackendList>, BackendError> {
        self.get("lists", token).await
    }

    async fn create_list(&self, token: &str, args: &ListArgs) -> Result<BackendList, BackendError> {
        self.send_json(Method::POST, "lists", Some(token), args).await
    }

    async fn update_list(&self, token: &str, remote_id: i64, args: &ListArgs) -> Result<BackendList, BackendError> {
        self.send_json(Method::PUT, &format!("lists/{}", remote_id), Some(token), args)
            .await
    }

    async fn delete_list(&self, token: &str, remote_id: i64) -> Result<(), BackendError> {
        self.send_empty(Method::DELETE, &format!("lists/{}", remote_id), token)
            .await
    }

    async fn fetch_tasks(&self, token: &str, list_remote_id: i64) -> Result<Vec<BackendTask>, BackendError> {
        self.get(&format!("lists/{}/tasks/", list_remote_id), token).await
    }

    async fn fetch_task(&self, token: &str, remote_id: i64) -> Result<BackendTask, BackendError> {
        self.get(&format!("tasks/{}", remote_id), token).await
    }

    async fn search_tasks(&self, token: &str, query: &str) -> Result<Vec<BackendTask>, BackendError> {
        let request = self
            .request(Method::GET, "tasks", Some(token))?
            .query(&[("search", query)]);
        let response = self.send(request).await?;
        Self::json(response).await
    }

    async fn create_task(
        &self,
        token: &str,
        list_remote_id: i64,
        args: &CreateTaskArgs,
    ) -> Result<BackendTask, BackendError> {
        self.send_json(
            Method::POST,
            &format!("lists/{}/tasks/", list_remote_id),
            Some(token),
            args,
        )
        .await
    }

    async fn update_task(&self, token: &str, remote_id: i64, args: &UpdateTaskArgs) -> Result<BackendTask, BackendError> {
        self.send_json(Method::PATCH, &format!("tasks/{}", remote_id), Some(token), args)
            .await
    }

    async fn delete_task(&self, token: &str, remote_id: i64) -> Result<(), BackendError> {
        self.send_empty(Method::DELETE, &format!("tasks/{}", remote_id), token)
            .await
    }
}
