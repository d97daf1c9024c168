//! Auth endpoint access: sessions, sign-in, sign-out, password recovery

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Method;
use serde_json::json;
use std::sync::{Arc, RwLock};

use crate::{
    error::{AppError, AppResult},
    models::session::{AuthUser, Credentials, Session},
};

use super::{client::check, session_store::SessionStore, AuthBackend, RestClient};

/// Session shared between the auth repository and the data repositories
pub type SessionHandle = Arc<RwLock<Option<Session>>>;

/// Read the access token of the current session, if any
pub fn current_token(handle: &SessionHandle) -> Option<String> {
    handle
        .read()
        .ok()
        .and_then(|guard| guard.as_ref().map(|s| s.access_token.clone()))
}

#[derive(Clone)]
pub struct AuthRepository {
    client: RestClient,
    store: SessionStore,
    session: SessionHandle,
}

impl AuthRepository {
    /// Create the repository, restoring a previously saved session if present
    pub fn new(client: RestClient, store: SessionStore) -> Self {
        let restored = store.load().unwrap_or_else(|e| {
            tracing::warn!("Ignoring unreadable session file: {}", e);
            None
        });

        Self {
            client,
            store,
            session: Arc::new(RwLock::new(restored)),
        }
    }

    pub fn session_handle(&self) -> SessionHandle {
        self.session.clone()
    }

    fn snapshot(&self) -> AppResult<Option<Session>> {
        self.session
            .read()
            .map(|guard| guard.clone())
            .map_err(|_| AppError::Internal("Session lock poisoned".to_string()))
    }

    fn replace(&self, session: Option<Session>) -> AppResult<()> {
        match &session {
            Some(s) => self.store.save(s)?,
            None => self.store.clear()?,
        }
        let mut guard = self
            .session
            .write()
            .map_err(|_| AppError::Internal("Session lock poisoned".to_string()))?;
        *guard = session;
        Ok(())
    }

    async fn refresh(&self, refresh_token: &str) -> AppResult<Session> {
        tracing::debug!("Refreshing expired session");
        let response = self
            .client
            .auth(Method::POST, "token?grant_type=refresh_token", None)
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;

        let session: Session = check(response).await?.json().await?;
        self.replace(Some(session.clone()))?;
        Ok(session)
    }
}

#[async_trait]
impl AuthBackend for AuthRepository {
    async fn get_session(&self) -> AppResult<Option<Session>> {
        let Some(session) = self.snapshot()? else {
            return Ok(None);
        };

        if !session.is_expired(Utc::now()) {
            return Ok(Some(session));
        }

        match session.refresh_token.as_deref() {
            Some(token) => self.refresh(token).await.map(Some),
            None => {
                self.replace(None)?;
                Ok(None)
            }
        }
    }

    async fn get_user(&self) -> AppResult<Option<AuthUser>> {
        let Some(session) = self.get_session().await? else {
            return Ok(None);
        };

        let response = self
            .client
            .auth(Method::GET, "user", Some(&session.access_token))
            .send()
            .await?;

        let user: AuthUser = check(response).await?.json().await?;
        Ok(Some(user))
    }

    async fn sign_in_with_password(&self, credentials: &Credentials) -> AppResult<Session> {
        let response = self
            .client
            .auth(Method::POST, "token?grant_type=password", None)
            .json(credentials)
            .send()
            .await?;

        let session: Session = check(response).await?.json().await?;
        self.replace(Some(session.clone()))?;
        tracing::info!("Signed in as {}", session.user.id);
        Ok(session)
    }

    async fn sign_out(&self) -> AppResult<()> {
        let token = current_token(&self.session);
        // The local session is dropped even if the remote call fails
        self.replace(None)?;

        let Some(token) = token else {
            return Ok(());
        };

        let response = self
            .client
            .auth(Method::POST, "logout", Some(&token))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn reset_password_for_email(&self, email: &str, redirect_to: &str) -> AppResult<()> {
        let response = self
            .client
            .auth(Method::POST, "recover", None)
            .query(&[("redirect_to", redirect_to)])
            .json(&json!({ "email": email }))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}
