use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_failure, output_success, prompt_password};
use crate::cli::OutputFormat;
use crate::error::ApiFailure;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login with email and password")]
    Login {
        #[arg(help = "Account email")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Logout and clear the stored credential")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,

    #[command(about = "Show current user information")]
    Whoami,

    #[command(about = "Register a new account")]
    Register {
        #[arg(help = "Account email")]
        email: String,
        #[arg(help = "Username")]
        username: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { email, password } => {
            let password = prompt_password(password)?;
            let mut manager = super::session_manager()?;

            match manager.login(&email, &password).await {
                Ok(session) => output_success(
                    &output_format,
                    &format!("Logged in as user {}", session.user_id),
                    Some(json!({
                        "user_id": session.user_id,
                        "expires_at": session.expires_at.map(|at| at.to_rfc3339()),
                    })),
                ),
                Err(failure) => fail(&output_format, &failure),
            }
        }

        AuthCommands::Logout => {
            let mut manager = super::session_manager()?;
            manager.logout();
            output_success(&output_format, "Logged out", None)
        }

        AuthCommands::Status => {
            let mut manager = super::session_manager()?;
            match manager.restore_from_store() {
                Some(session) => {
                    let expired = session.is_expired();
                    let expires_at = session.expires_at.map(|at| at.to_rfc3339());
                    let message = if expired {
                        format!(
                            "Logged in as user {} (token past its advisory expiry)",
                            session.user_id
                        )
                    } else {
                        format!("Logged in as user {}", session.user_id)
                    };
                    output_success(
                        &output_format,
                        &message,
                        Some(json!({
                            "authenticated": true,
                            "user_id": session.user_id,
                            "expires_at": expires_at,
                            "expired": expired,
                        })),
                    )
                }
                None => output_success(
                    &output_format,
                    "Not logged in",
                    Some(json!({ "authenticated": false })),
                ),
            }
        }

        AuthCommands::Whoami => {
            let mut manager = super::session_manager()?;
            let _ = manager.restore_from_store();

            match manager.whoami().await {
                Ok(profile) => output_success(
                    &output_format,
                    &format!("{} <{}>", profile.username, profile.email),
                    Some(json!({
                        "id": profile.id,
                        "email": profile.email,
                        "username": profile.username,
                        "is_active": profile.is_active,
                    })),
                ),
                Err(failure) => fail(&output_format, &failure),
            }
        }

        AuthCommands::Register {
            email,
            username,
            password,
        } => {
            let password = prompt_password(password)?;
            let manager = super::session_manager()?;

            match manager.register(&email, &username, &password).await {
                Ok(profile) => output_success(
                    &output_format,
                    &format!("Registered {} <{}>", profile.username, profile.email),
                    Some(json!({ "id": profile.id })),
                ),
                Err(failure) => fail(&output_format, &failure),
            }
        }
    }
}

fn fail(output_format: &OutputFormat, failure: &ApiFailure) -> anyhow::Result<()> {
    output_failure(output_format, failure)?;
    std::process::exit(1);
}
