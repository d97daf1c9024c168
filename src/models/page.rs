//! Front end pages a navigation can land on

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    Login,
    Dashboard,
    ReturnHistory,
    ResetPassword,
}

impl Page {
    pub fn path(&self) -> &'static str {
        match self {
            Page::Login => "index.html",
            Page::Dashboard => "dashboard.html",
            Page::ReturnHistory => "return_history.html",
            Page::ResetPassword => "reset.html",
        }
    }

    /// Pages that require a signed-in user
    pub fn requires_session(&self) -> bool {
        !matches!(self, Page::Login | Page::ResetPassword)
    }
}

impl std::fmt::Display for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}
