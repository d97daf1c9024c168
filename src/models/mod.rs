//! Data models for Rental Desk

pub mod page;
pub mod profile;
pub mod report;
pub mod session;

// Re-export commonly used types
pub use page::Page;
pub use profile::UserProfile;
pub use report::{RentalInfo, ReportType, ReturnCondition, ReturnRecord};
pub use session::{AuthUser, Credentials, Session};
