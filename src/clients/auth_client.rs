//! # Auth Client
//!
//! Login and token refresh over the request channel.

use crate::framework::{ApiError, AuthFacade, Response};
use crate::model::Tokens;
use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

/// Credentials are carried as-is; the type has no `Debug` so they cannot be logged.
pub enum AuthRequest {
    Login {
        username: String,
        password: String,
        respond_to: Response<Tokens>,
    },
    Refresh {
        refresh_token: String,
        respond_to: Response<Tokens>,
    },
}

#[derive(Clone)]
pub struct AuthClient {
    sender: mpsc::Sender<AuthRequest>,
}

impl AuthClient {
    pub fn new(sender: mpsc::Sender<AuthRequest>) -> Self {
        Self { sender }
    }

    async fn call(
        &self,
        build: impl FnOnce(Response<Tokens>) -> AuthRequest + Send,
    ) -> Result<Tokens, ApiError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| ApiError::Network("auth service closed".to_string()))?;
        response
            .await
            .map_err(|_| ApiError::Network("auth service dropped the reply".to_string()))?
    }
}

#[async_trait]
impl AuthFacade for AuthClient {
    #[instrument(skip(self, password))]
    async fn login(&self, username: &str, password: &str) -> Result<Tokens, ApiError> {
        debug!("Sending request");
        let username = username.to_string();
        let password = password.to_string();
        self.call(|respond_to| AuthRequest::Login {
            username,
            password,
            respond_to,
        })
        .await
    }

    #[instrument(skip_all)]
    async fn refresh(&self, refresh_token: &str) -> Result<Tokens, ApiError> {
        debug!("Sending request");
        let refresh_token = refresh_token.to_string();
        self.call(|respond_to| AuthRequest::Refresh {
            refresh_token,
            respond_to,
        })
        .await
    }
}
