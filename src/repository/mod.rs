//! Repository layer for the hosted auth and data API

pub mod auth;
pub mod client;
pub mod profiles;
pub mod reports;
pub mod session_store;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    error::AppResult,
    models::{
        profile::UserProfile,
        report::ReturnRecord,
        session::{AuthUser, Credentials, Session},
    },
};

pub use client::RestClient;
pub use session_store::SessionStore;

/// Operations of the hosted auth provider
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Current session, refreshed if it has expired
    async fn get_session(&self) -> AppResult<Option<Session>>;
    /// User owning the current session, as seen by the provider
    async fn get_user(&self) -> AppResult<Option<AuthUser>>;
    async fn sign_in_with_password(&self, credentials: &Credentials) -> AppResult<Session>;
    async fn sign_out(&self) -> AppResult<()>;
    async fn reset_password_for_email(&self, email: &str, redirect_to: &str) -> AppResult<()>;
}

/// Read queries against the hosted database
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DataBackend: Send + Sync {
    async fn profile_by_id(&self, id: Uuid) -> AppResult<UserProfile>;
    /// Returned/missing/sold reports joined with rental info, newest first
    async fn return_history(&self) -> AppResult<Vec<ReturnRecord>>;
}

/// Main repository struct holding the API client and per-table repositories
#[derive(Clone)]
pub struct Repository {
    pub auth: auth::AuthRepository,
    pub profiles: profiles::ProfilesRepository,
    pub reports: reports::ReportsRepository,
}

impl Repository {
    /// Create a new repository for the configured project
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        let client = RestClient::new(&config.api)?;
        let store = SessionStore::new(config.session.session_file.clone());
        Ok(Self::with_client(client, store))
    }

    pub fn with_client(client: RestClient, store: SessionStore) -> Self {
        let auth = auth::AuthRepository::new(client.clone(), store);
        let session = auth.session_handle();
        Self {
            profiles: profiles::ProfilesRepository::new(client.clone(), session.clone()),
            reports: reports::ReportsRepository::new(client, session),
            auth,
        }
    }
}

#[async_trait]
impl DataBackend for Repository {
    async fn profile_by_id(&self, id: Uuid) -> AppResult<UserProfile> {
        self.profiles.get_by_id(id).await
    }

    async fn return_history(&self) -> AppResult<Vec<ReturnRecord>> {
        self.reports.return_history().await
    }
}
