//! Rental Desk - command line front end

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use std::{io::Write, process::ExitCode};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use rental_desk::{
    cli::{Cli, Command, ShellLine},
    config::{AppConfig, LoggingConfig},
    models::page::Page,
    repository::Repository,
    security,
    services::{auth::LoginOutcome, history::FilterCriteria, notifications::{Notification, NotificationCenter}, Services},
    shell::ShellSession,
};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = AppConfig::load().context("Failed to load configuration")?;
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }

    let _log_guard = init_tracing(&config.logging);
    tracing::debug!("Starting Rental Desk v{}", env!("CARGO_PKG_VERSION"));

    let repository = Repository::new(&config).context("Failed to create API client")?;
    let services = Services::from_repository(repository, config);

    let ok = match cli.command {
        Command::Shell => shell(services).await?,
        command => {
            let result = run(&services, command).await;
            report(&services.notifications, result, &mut std::io::stderr())?
        }
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn write_toasts(out: &mut impl Write, notifications: Vec<Notification>) {
    for notification in notifications {
        let _ = writeln!(out, "{} {}", notification.kind.icon(), notification.message);
    }
}

fn print_toasts(notifications: Vec<Notification>) {
    write_toasts(&mut std::io::stderr(), notifications);
}

/// Write every toast of a finished command, then hand back its result
fn report(
    notifications: &NotificationCenter,
    result: anyhow::Result<bool>,
    out: &mut impl Write,
) -> anyhow::Result<bool> {
    write_toasts(out, notifications.snapshot());
    result
}

/// Interactive loop: one command per stdin line until `exit` or end of input
async fn shell(services: Services) -> anyhow::Result<bool> {
    let mut session = ShellSession::start(services).await;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut tick = tokio::time::interval(std::time::Duration::from_secs(1));

    println!("Rental Desk shell. Type `help` for commands, `exit` to quit.");
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if matches!(line, "exit" | "quit") {
                    break;
                }

                session.record_input();
                match ShellLine::parse(line) {
                    Ok(command) => {
                        if let Err(e) = run(session.services(), command).await {
                            eprintln!("Error: {:#}", e);
                        }
                    }
                    Err(e) => {
                        let _ = e.print();
                    }
                }
                session.sync_timer();
                print_toasts(session.take_new_toasts());
            }
            // Shows the inactivity logout while the prompt is idle
            _ = tick.tick() => {
                session.sync_timer();
                print_toasts(session.take_new_toasts());
            }
        }
    }

    Ok(true)
}

/// Set up stdout logging plus the optional rolling log file
fn init_tracing(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("rental_desk={}", config.level).into());

    let (pretty, json) = if config.format.eq_ignore_ascii_case("json") {
        (None, Some(fmt::layer().json().with_writer(std::io::stderr)))
    } else {
        (Some(fmt::layer().with_writer(std::io::stderr)), None)
    };

    let (file, guard) = match &config.directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "rental-desk.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(pretty)
        .with(json)
        .with(file)
        .init();

    guard
}

async fn run(services: &Services, command: Command) -> anyhow::Result<bool> {
    match command {
        Command::Login { email, password } => {
            let outcome = services.auth.login(&email, &password).await;
            if outcome == LoginOutcome::LoggedIn {
                println!("Logged in as {}", email.trim());
                println!("Next page: {}", services.navigation.current().unwrap_or(Page::Dashboard));
            }
            Ok(outcome == LoginOutcome::LoggedIn)
        }

        Command::Logout => {
            services.auth.logout().await;
            println!("Logged out");
            Ok(true)
        }

        Command::Whoami => {
            if !services.auth.guard_page(Page::Dashboard).await {
                println!("Not logged in");
                return Ok(false);
            }
            match services.auth.current_user_profile().await {
                Some(profile) => {
                    println!("{}", profile.display_name());
                    println!("Role: {}", profile.role.as_deref().unwrap_or("-"));
                    println!("Can delete records: {}", if services.auth.can_delete().await { "yes" } else { "no" });
                    Ok(true)
                }
                None => {
                    println!("No profile found for the current user");
                    Ok(false)
                }
            }
        }

        Command::ForgotPassword { email } => Ok(services.auth.forgot_password(&email).await),

        Command::History { filters, page, html } => {
            if !services.auth.guard_page(Page::ReturnHistory).await {
                println!("Not logged in");
                return Ok(false);
            }

            let mut view = services.history_view();
            if !view.load(services.data.as_ref()).await {
                return Ok(false);
            }
            let criteria = FilterCriteria::from(filters);
            if !criteria.is_empty() {
                view.apply_filters(criteria);
            }
            view.go_to_page(page);

            let stats = view.analytics();
            println!(
                "Total: {}  Good: {}  Damaged: {}  Missing: {}  Good rate: {}",
                stats.total, stats.good, stats.damaged, stats.missing, stats.good_percentage
            );

            let table = view.render_table();
            if table.empty_state {
                println!("No return records found");
                return Ok(true);
            }

            if html {
                println!("{}", table.body_html());
            } else {
                for row in &table.rows {
                    println!(
                        "{:<12} {:<24} {:<24} {:>4}  {:<8} {}",
                        row.date,
                        row.client,
                        row.item,
                        row.quantity,
                        row.condition,
                        row.notes.text()
                    );
                }
            }
            if let Some(label) = table.pagination.label() {
                println!("{}", label);
            }
            Ok(true)
        }

        Command::Export { filters, dir } => {
            if !services.auth.guard_page(Page::ReturnHistory).await {
                println!("Not logged in");
                return Ok(false);
            }

            let mut view = services.history_view();
            if !view.load(services.data.as_ref()).await {
                return Ok(false);
            }
            let criteria = FilterCriteria::from(filters);
            if !criteria.is_empty() {
                view.apply_filters(criteria);
            }

            let Some(export) = view.export_csv(Utc::now().date_naive()) else {
                return Ok(true);
            };
            let dir = dir.unwrap_or_else(|| services.config().history.export_dir.clone());
            let path = export
                .write_to(&dir)
                .with_context(|| format!("Failed to write export to {}", dir.display()))?;
            println!("Exported {} rows to {}", export.rows, path.display());
            Ok(true)
        }

        Command::Shell => {
            println!("Already in the shell");
            Ok(false)
        }

        Command::PasswordCheck { password } => {
            let strength = security::password_strength(&password);
            println!("Strength: {} ({}/4)", strength, security::password_score(&password));
            match security::validate_password(&password) {
                Ok(()) => {
                    println!("Password meets the policy");
                    Ok(true)
                }
                Err(e) => {
                    println!("{}", e);
                    Ok(false)
                }
            }
        }
    }
}
