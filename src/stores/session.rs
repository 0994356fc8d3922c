//! # Session Store
//!
//! Signs the admin in and keeps the token pair in a [`TokenStorage`]. Where
//! tokens live (memory, a keychain, browser storage) is the embedder's choice;
//! [`MemoryTokenStorage`] covers tests and the demo.

use crate::framework::{AuthFacade, StateStream, Subject};
use crate::model::Tokens;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{info, instrument, warn};

/// Persistence for the current token pair.
pub trait TokenStorage: Send + Sync {
    fn load(&self) -> Option<Tokens>;
    fn save(&self, tokens: Tokens);
    fn clear(&self);
}

#[derive(Default)]
pub struct MemoryTokenStorage {
    tokens: Mutex<Option<Tokens>>,
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> Option<Tokens> {
        self.tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn save(&self, tokens: Tokens) {
        *self.tokens.lock().unwrap_or_else(PoisonError::into_inner) = Some(tokens);
    }

    fn clear(&self) {
        *self.tokens.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub signing_in: bool,
    pub signed_in: bool,
    pub username: Option<String>,
    pub error: Option<String>,
}

pub struct SessionStore {
    auth: Arc<dyn AuthFacade>,
    tokens: Arc<dyn TokenStorage>,
    subject: Subject<SessionState>,
}

impl SessionStore {
    /// Starts signed in when the storage already holds tokens.
    pub fn new(auth: Arc<dyn AuthFacade>, tokens: Arc<dyn TokenStorage>) -> Self {
        let signed_in = tokens.load().is_some();
        Self {
            auth,
            tokens,
            subject: Subject::new(SessionState {
                signed_in,
                ..SessionState::default()
            }),
        }
    }

    pub fn snapshot(&self) -> SessionState {
        self.subject.snapshot()
    }

    pub fn subscribe(&self) -> StateStream<SessionState> {
        self.subject.subscribe()
    }

    /// The current access token, for attaching to outgoing requests.
    pub fn access_token(&self) -> Option<String> {
        self.tokens.load().map(|tokens| tokens.access_token)
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> bool {
        self.subject.update(|state| {
            state.signing_in = true;
            state.error = None;
        });

        match self.auth.login(username, password).await {
            Ok(tokens) => {
                info!("Signed in");
                self.tokens.save(tokens);
                self.subject.replace(SessionState {
                    signing_in: false,
                    signed_in: true,
                    username: Some(username.to_string()),
                    error: None,
                });
                true
            }
            Err(e) => {
                warn!(error = %e, "Sign in failed");
                self.tokens.clear();
                self.subject.replace(SessionState {
                    error: Some(e.to_string()),
                    ..SessionState::default()
                });
                false
            }
        }
    }

    /// Exchanges the stored refresh token for a new pair.
    ///
    /// A rejected refresh ends the session.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> bool {
        let Some(current) = self.tokens.load() else {
            warn!("No session to refresh");
            self.subject.update(|state| {
                state.signed_in = false;
                state.error = Some("not signed in".to_string());
            });
            return false;
        };

        match self.auth.refresh(&current.refresh_token).await {
            Ok(tokens) => {
                info!("Session refreshed");
                self.tokens.save(tokens);
                self.subject.update(|state| {
                    state.signed_in = true;
                    state.error = None;
                });
                true
            }
            Err(e) => {
                warn!(error = %e, "Refresh failed");
                self.tokens.clear();
                self.subject.replace(SessionState {
                    error: Some(e.to_string()),
                    ..SessionState::default()
                });
                false
            }
        }
    }

    pub fn logout(&self) {
        info!("Signed out");
        self.tokens.clear();
        self.subject.replace(SessionState::default());
    }
}
