//! Automatic logout after a period without user activity

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{sleep_until, Instant},
};

use crate::models::page::Page;

use super::{auth::AuthService, notifications::NotificationCenter};

pub const INACTIVITY_MESSAGE: &str = "Session expired due to inactivity. Please log in again.";

/// User input that counts as activity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    MouseMove,
    KeyPress,
    Click,
    Scroll,
}

/// Countdown reset by every activity; on expiry the user is warned and
/// logged out. Dropping the timer cancels it.
pub struct InactivityTimer {
    deadline: watch::Sender<Instant>,
    expired: Arc<AtomicBool>,
    timeout: Duration,
    task: JoinHandle<()>,
}

impl InactivityTimer {
    /// Start the countdown unless `page` is the login page
    pub fn start_for(
        page: Page,
        timeout: Duration,
        auth: AuthService,
        notifications: NotificationCenter,
    ) -> Option<Self> {
        if page == Page::Login {
            return None;
        }
        Some(Self::start(timeout, auth, notifications))
    }

    pub fn start(timeout: Duration, auth: AuthService, notifications: NotificationCenter) -> Self {
        let (deadline, mut changes) = watch::channel(Instant::now() + timeout);
        let expired = Arc::new(AtomicBool::new(false));

        let flag = expired.clone();
        let task = tokio::spawn(async move {
            loop {
                let until = *changes.borrow_and_update();
                tokio::select! {
                    _ = sleep_until(until) => {
                        flag.store(true, Ordering::SeqCst);
                        tracing::info!("Inactivity timeout reached, logging out");
                        notifications.warning(INACTIVITY_MESSAGE);
                        auth.logout().await;
                        break;
                    }
                    changed = changes.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
        });

        Self {
            deadline,
            expired,
            timeout,
            task,
        }
    }

    /// Push the deadline back by a full timeout
    pub fn touch(&self) {
        if self.is_expired() {
            return;
        }
        let _ = self.deadline.send(Instant::now() + self.timeout);
    }

    pub fn record(&self, activity: Activity) {
        tracing::trace!("Activity: {:?}", activity);
        self.touch();
    }

    pub fn is_expired(&self) -> bool {
        self.expired.load(Ordering::SeqCst)
    }

    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for InactivityTimer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
