//! Rental Desk
//!
//! Client for a rental inventory tracker hosted on a Supabase-style backend:
//! login and session handling, the returns history with filters, pagination
//! and CSV export, toast notifications and input validation helpers.

pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod security;
pub mod services;
pub mod shell;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use services::Services;
