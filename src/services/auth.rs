//! Authentication and session service
//!
//! Remote failures never escape from here: they are logged and turned into
//! the safe answer (not logged in, no profile, not an admin).

use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use validator::Validate;

use crate::{
    models::{page::Page, profile::UserProfile, session::Credentials},
    repository::{AuthBackend, DataBackend},
};

use super::{
    navigation::Navigator,
    notifications::NotificationCenter,
    rate_limit::{LoginRateLimiter, RateLimitDecision},
};

/// Result of a login attempt from the login form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    MissingCredentials,
    RateLimited { remaining_minutes: i64 },
    Failed(String),
    LoggedIn,
}

#[derive(Clone)]
pub struct AuthService {
    auth: Arc<dyn AuthBackend>,
    data: Arc<dyn DataBackend>,
    notifications: NotificationCenter,
    navigator: Arc<dyn Navigator>,
    limiter: Arc<Mutex<LoginRateLimiter>>,
    site_url: String,
}

impl AuthService {
    pub fn new(
        auth: Arc<dyn AuthBackend>,
        data: Arc<dyn DataBackend>,
        notifications: NotificationCenter,
        navigator: Arc<dyn Navigator>,
        limiter: LoginRateLimiter,
        site_url: impl Into<String>,
    ) -> Self {
        Self {
            auth,
            data,
            notifications,
            navigator,
            limiter: Arc::new(Mutex::new(limiter)),
            site_url: site_url.into(),
        }
    }

    fn limiter(&self) -> MutexGuard<'_, LoginRateLimiter> {
        self.limiter.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether a session exists; lookup errors count as logged out
    pub async fn is_logged_in(&self) -> bool {
        match self.auth.get_session().await {
            Ok(session) => session.is_some(),
            Err(e) => {
                tracing::error!("Error getting session: {}", e);
                false
            }
        }
    }

    /// Profile row of the signed-in user, or `None` on any failure
    pub async fn current_user_profile(&self) -> Option<UserProfile> {
        let user = match self.auth.get_user().await {
            Ok(Some(user)) => user,
            Ok(None) => {
                tracing::error!("Error getting user: no active session");
                return None;
            }
            Err(e) => {
                tracing::error!("Error getting user: {}", e);
                return None;
            }
        };

        match self.data.profile_by_id(user.id).await {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::error!("Error fetching profile: {}", e);
                None
            }
        }
    }

    pub async fn is_admin(&self) -> bool {
        self.current_user_profile()
            .await
            .map(|profile| profile.is_admin())
            .unwrap_or(false)
    }

    /// Deleting records is reserved to admins
    pub async fn can_delete(&self) -> bool {
        self.is_admin().await
    }

    /// Sign out and go back to the login page, whatever the provider says
    pub async fn logout(&self) {
        if let Err(e) = self.auth.sign_out().await {
            tracing::error!("Error during logout: {}", e);
        }
        self.navigator.navigate(Page::Login);
    }

    /// Send the user to the login page if `page` needs a session and there is none
    pub async fn guard_page(&self, page: Page) -> bool {
        if !page.requires_session() || self.is_logged_in().await {
            return true;
        }
        self.navigator.navigate(Page::Login);
        false
    }

    /// Handle a submission of the login form
    pub async fn login(&self, email: &str, password: &str) -> LoginOutcome {
        let credentials = Credentials::new(email, password);
        if credentials.validate().is_err() {
            self.notifications.warning("Please enter both email and password.");
            return LoginOutcome::MissingCredentials;
        }

        let decision = self.limiter().check(&credentials.email, Utc::now());
        if let RateLimitDecision::Blocked { remaining_minutes } = decision {
            self.notifications.error(format!(
                "Too many login attempts. Please try again in {} minute(s).",
                remaining_minutes
            ));
            return LoginOutcome::RateLimited { remaining_minutes };
        }

        match self.auth.sign_in_with_password(&credentials).await {
            Ok(_) => {
                self.limiter().record_success(&credentials.email);
                self.navigator.navigate(Page::Dashboard);
                LoginOutcome::LoggedIn
            }
            Err(e) => {
                tracing::error!("Login error: {}", e);
                let message = e.user_message();
                self.notifications.error(format!("Login failed: {}", message));
                self.limiter().record_failure(&credentials.email, Utc::now());
                LoginOutcome::Failed(message)
            }
        }
    }

    /// Ask the provider to mail a password reset link.
    ///
    /// Returns `true` once the mail has been requested; an empty email does
    /// nothing.
    pub async fn forgot_password(&self, email: &str) -> bool {
        let email = email.trim();
        if email.is_empty() {
            return false;
        }

        let redirect_to = format!(
            "{}/{}",
            self.site_url.trim_end_matches('/'),
            Page::ResetPassword.path()
        );

        match self.auth.reset_password_for_email(email, &redirect_to).await {
            Ok(()) => {
                self.notifications.success("Password reset email sent! Check your inbox.");
                true
            }
            Err(e) => {
                tracing::error!("Reset password error: {}", e);
                self.notifications
                    .error(format!("Failed to send reset email: {}", e.user_message()));
                false
            }
        }
    }
}
