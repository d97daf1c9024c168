//! Toast notifications and yes/no confirmations
//!
//! Every notification moves through `Created -> Inserted -> Visible -> Hiding
//! -> Removed`. Plain toasts leave on a timer (unless their duration is zero),
//! confirmations stay until answered. The container holding them is created
//! on first use and shared by everything shown afterwards.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};
use tokio::time::sleep;

use crate::security::escape_html;

/// Delay before a freshly inserted toast is marked visible
pub const SHOW_DELAY: Duration = Duration::from_millis(10);
/// Length of the hide animation before removal
pub const HIDE_ANIMATION: Duration = Duration::from_millis(300);

/// DOM id of the shared container
pub const CONTAINER_ID: &str = "toast-container";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
    Confirm,
}

impl NotificationKind {
    pub fn icon(&self) -> &'static str {
        match self {
            NotificationKind::Success => "✅",
            NotificationKind::Error => "❌",
            NotificationKind::Warning => "⚠️",
            NotificationKind::Info => "ℹ️",
            NotificationKind::Confirm => "❓",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
            NotificationKind::Warning => "warning",
            NotificationKind::Info => "info",
            NotificationKind::Confirm => "confirm",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationState {
    Created,
    Inserted,
    Visible,
    Hiding,
    Removed,
}

pub type NotificationId = u64;

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub message: String,
    pub state: NotificationState,
    /// `None` means the notification never leaves on its own
    pub duration: Option<Duration>,
}

impl Notification {
    /// Markup for the toast, message escaped
    pub fn to_html(&self) -> String {
        let message = escape_html(&self.message);
        let visible = if self.state == NotificationState::Visible { " show" } else { "" };

        match self.kind {
            NotificationKind::Confirm => format!(
                concat!(
                    r#"<div class="toast toast-confirm{}" data-id="{}">"#,
                    r#"<div class="toast-content"><span class="toast-icon">{}</span><span class="toast-message">{}</span></div>"#,
                    r#"<div class="toast-actions"><button class="toast-btn toast-btn-yes">Yes</button><button class="toast-btn toast-btn-no">No</button></div>"#,
                    "</div>"
                ),
                visible,
                self.id,
                self.kind.icon(),
                message
            ),
            kind => format!(
                concat!(
                    r#"<div class="toast toast-{}{}" data-id="{}">"#,
                    r#"<div class="toast-content"><span class="toast-icon">{}</span><span class="toast-message">{}</span></div>"#,
                    r#"<button class="toast-close">✕</button>"#,
                    "</div>"
                ),
                kind.as_str(),
                visible,
                self.id,
                kind.icon(),
                message
            ),
        }
    }
}

type Callback = Box<dyn FnOnce() + Send>;

struct Entry {
    notification: Notification,
    on_confirm: Option<Callback>,
    on_cancel: Option<Callback>,
}

/// Shared holder of all live notifications
struct ToastContainer {
    entries: Vec<Entry>,
}

impl ToastContainer {
    fn position(&self, id: NotificationId) -> Option<usize> {
        self.entries.iter().position(|e| e.notification.id == id)
    }
}

#[derive(Default)]
struct Inner {
    container: Option<ToastContainer>,
    next_id: NotificationId,
    containers_created: usize,
}

impl Inner {
    fn container(&mut self) -> &mut ToastContainer {
        if self.container.is_none() {
            self.containers_created += 1;
        }
        self.container.get_or_insert_with(|| ToastContainer { entries: Vec::new() })
    }

    fn set_state(&mut self, id: NotificationId, state: NotificationState) -> bool {
        let Some(container) = self.container.as_mut() else {
            return false;
        };
        match container.position(id) {
            Some(index) => {
                container.entries[index].notification.state = state;
                true
            }
            None => false,
        }
    }

    fn remove(&mut self, id: NotificationId) -> Option<Entry> {
        let container = self.container.as_mut()?;
        let index = container.position(id)?;
        Some(container.entries.remove(index))
    }
}

/// Notification service, constructed once and shared by reference.
///
/// Timers run on the tokio runtime, so `show` and friends must be called
/// from within one.
#[derive(Clone)]
pub struct NotificationCenter {
    inner: Arc<Mutex<Inner>>,
    default_duration: Duration,
}

impl NotificationCenter {
    pub fn new(default_duration: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            default_duration,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Show a toast; a zero duration keeps it until dismissed
    pub fn show(&self, message: impl Into<String>, kind: NotificationKind, duration: Duration) -> NotificationId {
        let duration = (!duration.is_zero()).then_some(duration);
        let id = self.insert(message.into(), kind, duration, None, None);

        let inner = self.inner.clone();
        tokio::spawn(async move {
            sleep(SHOW_DELAY).await;
            if !lock(&inner).set_state(id, NotificationState::Visible) {
                return;
            }

            let Some(duration) = duration else {
                return;
            };
            sleep(duration).await;
            if !lock(&inner).set_state(id, NotificationState::Hiding) {
                return;
            }
            sleep(HIDE_ANIMATION).await;
            if lock(&inner).remove(id).is_some() {
                tracing::trace!("Notification {} removed", id);
            }
        });

        id
    }

    pub fn success(&self, message: impl Into<String>) -> NotificationId {
        self.show(message, NotificationKind::Success, self.default_duration)
    }

    pub fn error(&self, message: impl Into<String>) -> NotificationId {
        self.show(message, NotificationKind::Error, self.default_duration)
    }

    pub fn warning(&self, message: impl Into<String>) -> NotificationId {
        self.show(message, NotificationKind::Warning, self.default_duration)
    }

    pub fn info(&self, message: impl Into<String>) -> NotificationId {
        self.show(message, NotificationKind::Info, self.default_duration)
    }

    /// Ask a yes/no question. No timer: the toast stays until `answer`.
    pub fn confirm<Y, N>(&self, message: impl Into<String>, on_confirm: Option<Y>, on_cancel: Option<N>) -> NotificationId
    where
        Y: FnOnce() + Send + 'static,
        N: FnOnce() + Send + 'static,
    {
        let id = self.insert(
            message.into(),
            NotificationKind::Confirm,
            None,
            on_confirm.map(|f| Box::new(f) as Callback),
            on_cancel.map(|f| Box::new(f) as Callback),
        );

        let inner = self.inner.clone();
        tokio::spawn(async move {
            sleep(SHOW_DELAY).await;
            lock(&inner).set_state(id, NotificationState::Visible);
        });

        id
    }

    /// Click on Yes (`true`) or No (`false`) of a confirmation.
    ///
    /// Runs the matching callback, then removes the toast. Returns `false`
    /// if there is no such pending confirmation.
    pub fn answer(&self, id: NotificationId, yes: bool) -> bool {
        let entry = {
            let mut inner = self.lock();
            let is_confirm = inner
                .container
                .as_ref()
                .and_then(|c| c.position(id).map(|i| c.entries[i].notification.kind))
                == Some(NotificationKind::Confirm);
            if !is_confirm {
                return false;
            }
            inner.remove(id)
        };

        // Callbacks run without the lock held so they can show new toasts
        if let Some(entry) = entry {
            let callback = if yes { entry.on_confirm } else { entry.on_cancel };
            if let Some(callback) = callback {
                callback();
            }
        }
        true
    }

    /// Close button: remove a toast immediately
    pub fn dismiss(&self, id: NotificationId) -> bool {
        self.lock().remove(id).is_some()
    }

    /// Notifications currently in the container, oldest first
    pub fn snapshot(&self) -> Vec<Notification> {
        self.lock()
            .container
            .as_ref()
            .map(|c| c.entries.iter().map(|e| e.notification.clone()).collect())
            .unwrap_or_default()
    }

    pub fn state_of(&self, id: NotificationId) -> NotificationState {
        self.lock()
            .container
            .as_ref()
            .and_then(|c| c.position(id).map(|i| c.entries[i].notification.state))
            .unwrap_or(NotificationState::Removed)
    }

    /// Markup of the whole container, or `None` before the first notification
    pub fn render(&self) -> Option<String> {
        let inner = self.lock();
        let container = inner.container.as_ref()?;
        let body: String = container.entries.iter().map(|e| e.notification.to_html()).collect();
        Some(format!(r#"<div id="{}" class="toast-container">{}</div>"#, CONTAINER_ID, body))
    }

    /// How many times a container had to be created (1 after first use)
    pub fn containers_created(&self) -> usize {
        self.lock().containers_created
    }

    fn insert(
        &self,
        message: String,
        kind: NotificationKind,
        duration: Option<Duration>,
        on_confirm: Option<Callback>,
        on_cancel: Option<Callback>,
    ) -> NotificationId {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = inner.next_id;

        let mut notification = Notification {
            id,
            kind,
            message,
            state: NotificationState::Created,
            duration,
        };
        match kind {
            NotificationKind::Error => tracing::error!(target: "notifications", "{}", notification.message),
            NotificationKind::Warning => tracing::warn!(target: "notifications", "{}", notification.message),
            _ => tracing::info!(target: "notifications", "{}", notification.message),
        }

        notification.state = NotificationState::Inserted;
        inner.container().entries.push(Entry {
            notification,
            on_confirm,
            on_cancel,
        });
        id
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(Duration::from_millis(5000))
    }
}

fn lock(inner: &Arc<Mutex<Inner>>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}
