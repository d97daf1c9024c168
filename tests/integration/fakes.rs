//! In-memory stand-ins for the hosted auth and data API

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
};
use uuid::Uuid;

use rental_desk::{
    config::AppConfig,
    models::{
        profile::UserProfile,
        report::{RentalInfo, ReportType, ReturnCondition, ReturnRecord},
        session::{AuthUser, Credentials, Session},
    },
    repository::{AuthBackend, DataBackend},
    AppError, AppResult, Services,
};

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const STAFF_EMAIL: &str = "staff@example.com";
pub const PASSWORD: &str = "Correct-Horse-42";

pub struct Account {
    pub email: &'static str,
    pub id: Uuid,
    pub role: &'static str,
}

pub struct FakeAuth {
    accounts: Vec<Account>,
    session: Mutex<Option<Session>>,
    pub sign_ins: AtomicUsize,
    pub sign_outs: AtomicUsize,
    pub reset_requests: Mutex<Vec<(String, String)>>,
}

impl FakeAuth {
    pub fn new() -> Self {
        Self {
            accounts: vec![
                Account {
                    email: ADMIN_EMAIL,
                    id: Uuid::new_v4(),
                    role: "Admin",
                },
                Account {
                    email: STAFF_EMAIL,
                    id: Uuid::new_v4(),
                    role: "staff",
                },
            ],
            session: Mutex::new(None),
            sign_ins: AtomicUsize::new(0),
            sign_outs: AtomicUsize::new(0),
            reset_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn profiles(&self) -> Vec<UserProfile> {
        self.accounts
            .iter()
            .map(|a| UserProfile {
                id: a.id,
                fullname: Some(a.email.split('@').next().unwrap_or_default().to_string()),
                role: Some(a.role.to_string()),
                created_at: None,
            })
            .collect()
    }

    pub fn has_session(&self) -> bool {
        self.session.lock().unwrap().is_some()
    }
}

#[async_trait]
impl AuthBackend for FakeAuth {
    async fn get_session(&self) -> AppResult<Option<Session>> {
        Ok(self.session.lock().unwrap().clone())
    }

    async fn get_user(&self) -> AppResult<Option<AuthUser>> {
        Ok(self.session.lock().unwrap().as_ref().map(|s| s.user.clone()))
    }

    async fn sign_in_with_password(&self, credentials: &Credentials) -> AppResult<Session> {
        self.sign_ins.fetch_add(1, Ordering::SeqCst);
        let account = self
            .accounts
            .iter()
            .find(|a| a.email == credentials.email && credentials.password == PASSWORD)
            .ok_or_else(|| AppError::Remote {
                status: 400,
                message: "Invalid login credentials".to_string(),
            })?;

        let session = Session {
            access_token: format!("token-{}", account.id),
            refresh_token: Some("refresh".to_string()),
            token_type: Some("bearer".to_string()),
            expires_in: Some(3600),
            expires_at: None,
            user: AuthUser {
                id: account.id,
                email: Some(account.email.to_string()),
                role: Some("authenticated".to_string()),
            },
        };
        *self.session.lock().unwrap() = Some(session.clone());
        Ok(session)
    }

    async fn sign_out(&self) -> AppResult<()> {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        *self.session.lock().unwrap() = None;
        Ok(())
    }

    async fn reset_password_for_email(&self, email: &str, redirect_to: &str) -> AppResult<()> {
        self.reset_requests
            .lock()
            .unwrap()
            .push((email.to_string(), redirect_to.to_string()));
        Ok(())
    }
}

pub struct FakeData {
    profiles: Vec<UserProfile>,
    records: Vec<ReturnRecord>,
    pub failing: AtomicBool,
}

impl FakeData {
    pub fn new(profiles: Vec<UserProfile>, records: Vec<ReturnRecord>) -> Self {
        Self {
            profiles,
            records,
            failing: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl DataBackend for FakeData {
    async fn profile_by_id(&self, id: Uuid) -> AppResult<UserProfile> {
        self.profiles
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Profile with id {} not found", id)))
    }

    async fn return_history(&self) -> AppResult<Vec<ReturnRecord>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Remote {
                status: 503,
                message: "Service unavailable".to_string(),
            });
        }
        Ok(self.records.clone())
    }
}

/// 45 records over May 2024, newest first; every third is damaged and every
/// fifth missing, the rest good
pub fn sample_records() -> Vec<ReturnRecord> {
    (0..45u32)
        .rev()
        .map(|i| {
            let condition = if i % 5 == 0 {
                ReturnCondition::Missing
            } else if i % 3 == 0 {
                ReturnCondition::Damaged
            } else {
                ReturnCondition::Good
            };
            ReturnRecord {
                created_at: Utc.with_ymd_and_hms(2024, 5, 1 + i % 30, 9, 0, 0).unwrap(),
                report_type: if condition == ReturnCondition::Missing {
                    ReportType::Missing
                } else {
                    ReportType::Returned
                },
                damage_notes: (condition == ReturnCondition::Damaged).then(|| format!("Dent #{}", i)),
                return_condition: Some(condition),
                item_name: Some(if i % 2 == 0 { "Folding chair" } else { "Party tent" }.to_string()),
                quantity: Some(i64::from(i % 4 + 1)),
                notes: Some(format!("Return {}, checked", i)),
                rental: Some(RentalInfo {
                    renter_name: Some(if i % 4 == 0 { "Jane Smith" } else { "Bob Jones" }.to_string()),
                    ..Default::default()
                }),
            }
        })
        .collect()
}

pub struct Harness {
    pub services: Services,
    pub auth: Arc<FakeAuth>,
    pub data: Arc<FakeData>,
}

pub fn harness() -> Harness {
    let auth = Arc::new(FakeAuth::new());
    let data = Arc::new(FakeData::new(auth.profiles(), sample_records()));

    let mut config = AppConfig::default();
    config.api.site_url = "https://desk.example.com".to_string();
    config.history.date_format = "%Y-%m-%d".to_string();

    let services = Services::new(auth.clone(), data.clone(), config);
    Harness { services, auth, data }
}
