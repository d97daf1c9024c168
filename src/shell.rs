//! State kept across the lines of an interactive session
//!
//! A one-shot command lives for a single process, so the login lockout and
//! the inactivity timeout only mean something here, where one `Services`
//! serves every line.

use crate::{
    models::page::Page,
    services::{
        inactivity::{Activity, InactivityTimer},
        navigation::Navigator,
        notifications::{Notification, NotificationId},
        Services,
    },
};

pub struct ShellSession {
    services: Services,
    timer: Option<InactivityTimer>,
    /// Highest notification id already handed out by `take_new_toasts`
    seen: NotificationId,
}

impl ShellSession {
    /// Open a session, resuming on the dashboard if a saved login is still valid
    pub async fn start(services: Services) -> Self {
        if services.auth.is_logged_in().await {
            services.navigation.navigate(Page::Dashboard);
        }

        let mut session = Self {
            services,
            timer: None,
            seen: 0,
        };
        session.sync_timer();
        session
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Every typed line counts as activity
    pub fn record_input(&self) {
        if let Some(timer) = &self.timer {
            timer.record(Activity::KeyPress);
        }
    }

    /// Run the inactivity timer whenever the user is past the login page
    pub fn sync_timer(&mut self) {
        if self.timer.as_ref().is_some_and(InactivityTimer::is_expired) {
            self.timer = None;
        }

        match self.services.navigation.current().unwrap_or(Page::Login) {
            Page::Login => self.timer = None,
            page if self.timer.is_none() => {
                tracing::debug!("Starting inactivity timer on {}", page);
                self.timer = self.services.inactivity_timer(page);
            }
            _ => {}
        }
    }

    pub fn timer_running(&self) -> bool {
        self.timer.as_ref().is_some_and(|t| !t.is_expired())
    }

    /// Notifications shown since the last call
    pub fn take_new_toasts(&mut self) -> Vec<Notification> {
        let fresh: Vec<Notification> = self
            .services
            .notifications
            .snapshot()
            .into_iter()
            .filter(|n| n.id > self.seen)
            .collect();
        if let Some(last) = fresh.iter().map(|n| n.id).max() {
            self.seen = last;
        }
        fresh
    }
}
