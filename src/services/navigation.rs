//! Page navigation

use std::sync::{Mutex, PoisonError};

use crate::models::page::Page;

/// Receives redirects issued by the auth flows
pub trait Navigator: Send + Sync {
    fn navigate(&self, page: Page);
}

/// Navigator that remembers where the user was last sent
#[derive(Debug, Default)]
pub struct PageTracker {
    current: Mutex<Option<Page>>,
}

impl PageTracker {
    pub fn new(start: Page) -> Self {
        Self {
            current: Mutex::new(Some(start)),
        }
    }

    pub fn current(&self) -> Option<Page> {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Navigator for PageTracker {
    fn navigate(&self, page: Page) {
        tracing::debug!("Navigating to {}", page);
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(page);
    }
}
