use std::time::Duration;

use rental_desk::{
    models::page::Page,
    services::{auth::LoginOutcome, inactivity::INACTIVITY_MESSAGE, notifications::NotificationKind},
    shell::ShellSession,
    Services,
};

use crate::fakes::{harness, ADMIN_EMAIL, PASSWORD, STAFF_EMAIL};

#[tokio::test]
async fn lockout_carries_across_lines() {
    let h = harness();
    let mut session = ShellSession::start(h.services.clone()).await;
    assert!(!session.timer_running());

    for _ in 0..5 {
        session.record_input();
        let outcome = session.services().auth.login(STAFF_EMAIL, "wrong").await;
        assert!(matches!(outcome, LoginOutcome::Failed(_)));
        session.sync_timer();
        assert_eq!(session.take_new_toasts().len(), 1);
    }

    session.record_input();
    assert_eq!(
        session.services().auth.login(STAFF_EMAIL, PASSWORD).await,
        LoginOutcome::RateLimited { remaining_minutes: 15 }
    );
    session.sync_timer();
    assert!(!session.timer_running());

    let toasts = session.take_new_toasts();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].message, "Too many login attempts. Please try again in 15 minute(s).");
    assert!(session.take_new_toasts().is_empty());
}

#[tokio::test(start_paused = true)]
async fn typing_keeps_the_session_alive_until_idle() {
    let h = harness();
    let mut session = ShellSession::start(h.services.clone()).await;

    assert_eq!(session.services().auth.login(ADMIN_EMAIL, PASSWORD).await, LoginOutcome::LoggedIn);
    session.sync_timer();
    assert!(session.timer_running());

    for _ in 0..3 {
        tokio::time::sleep(Duration::from_secs(25 * 60)).await;
        session.record_input();
        session.sync_timer();
        assert!(h.auth.has_session());
    }

    tokio::time::sleep(Duration::from_secs(30 * 60 + 1)).await;
    session.sync_timer();
    assert!(!session.timer_running());
    assert!(!h.auth.has_session());
    assert_eq!(h.services.navigation.current(), Some(Page::Login));

    let toasts = session.take_new_toasts();
    let warning = toasts.last().unwrap();
    assert_eq!(warning.kind, NotificationKind::Warning);
    assert_eq!(warning.message, INACTIVITY_MESSAGE);
}

#[tokio::test(start_paused = true)]
async fn saved_login_resumes_on_dashboard() {
    let h = harness();
    assert_eq!(h.services.auth.login(ADMIN_EMAIL, PASSWORD).await, LoginOutcome::LoggedIn);

    // A new process reuses the stored session but starts on the login page
    let services = Services::new(h.auth.clone(), h.data.clone(), h.services.config().clone());
    assert_eq!(services.navigation.current(), Some(Page::Login));

    let mut session = ShellSession::start(services).await;
    assert_eq!(session.services().navigation.current(), Some(Page::Dashboard));
    assert!(session.timer_running());

    session.services().auth.logout().await;
    session.sync_timer();
    assert!(!session.timer_running());
}
