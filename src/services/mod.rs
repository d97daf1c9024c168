//! Client-side services

pub mod auth;
pub mod export;
pub mod history;
pub mod inactivity;
pub mod navigation;
pub mod notifications;
pub mod rate_limit;

use std::sync::Arc;

use crate::{
    config::AppConfig,
    models::page::Page,
    repository::{AuthBackend, DataBackend, Repository},
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub notifications: notifications::NotificationCenter,
    pub navigation: Arc<navigation::PageTracker>,
    pub data: Arc<dyn DataBackend>,
    config: Arc<AppConfig>,
}

impl Services {
    /// Wire every service on top of the given backends
    pub fn new(auth: Arc<dyn AuthBackend>, data: Arc<dyn DataBackend>, config: AppConfig) -> Self {
        let notifications = notifications::NotificationCenter::new(config.notifications.default_duration());
        let navigation = Arc::new(navigation::PageTracker::new(Page::Login));

        let auth = auth::AuthService::new(
            auth,
            data.clone(),
            notifications.clone(),
            navigation.clone(),
            rate_limit::LoginRateLimiter::from_config(&config.login),
            config.api.site_url.clone(),
        );

        Self {
            auth,
            notifications,
            navigation,
            data,
            config: Arc::new(config),
        }
    }

    /// Services backed by the hosted API
    pub fn from_repository(repository: Repository, config: AppConfig) -> Self {
        let auth = Arc::new(repository.auth.clone());
        Self::new(auth, Arc::new(repository), config)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Fresh history screen using the configured page size and date format
    pub fn history_view(&self) -> history::ReturnHistoryView {
        history::ReturnHistoryView::new(
            self.notifications.clone(),
            self.config.history.page_size,
            self.config.history.date_format.clone(),
        )
    }

    /// Inactivity countdown for `page`; none on the login page
    pub fn inactivity_timer(&self, page: Page) -> Option<inactivity::InactivityTimer> {
        inactivity::InactivityTimer::start_for(
            page,
            self.config.session.inactivity_timeout(),
            self.auth.clone(),
            self.notifications.clone(),
        )
    }
}
