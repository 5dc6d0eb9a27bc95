use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::app::{self, AppState};
use crate::auth::SuperadminGate;
use crate::config;

#[derive(Parser)]
#[command(name = "collab-admin")]
#[command(about = "Superadmin API for the collaboration workspace backend")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Start the HTTP server")]
    Serve {
        #[arg(long, help = "Port to listen on (defaults to PORT / ADMIN_API_PORT / 3000)")]
        port: Option<u16>,
    },

    #[command(about = "Check whether an email is on the superadmin allowlist")]
    Check {
        email: String,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Commands::Serve { port } => {
            serve(port).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check { email } => Ok(check(&email)),
    }
}

async fn serve(port: Option<u16>) -> anyhow::Result<()> {
    let config = config::config();
    tracing::info!("Starting Collaboration Admin API in {:?} mode", config.environment);

    let state = AppState::from_config(config)?;
    let app = app::app(state, &config.security);

    let bind_addr = format!("0.0.0.0:{}", port.unwrap_or(config.server.port));
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Listening on http://{}", bind_addr);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

fn check(email: &str) -> ExitCode {
    let gate = SuperadminGate::new(config::config().security.superadmin_emails.iter().cloned());

    if gate.is_privileged(Some(email)) {
        println!("allowed");
        ExitCode::SUCCESS
    } else {
        println!("denied");
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_serve_with_port() {
        let cli = Cli::try_parse_from(["collab-admin", "serve", "--port", "8080"]).unwrap();
        assert!(matches!(cli.command, Commands::Serve { port: Some(8080) }));
    }

    #[test]
    fn parses_check() {
        let cli = Cli::try_parse_from(["collab-admin", "check", "joe@upupdndn.ai"]).unwrap();
        match cli.command {
            Commands::Check { email } => assert_eq!(email, "joe@upupdndn.ai"),
            _ => panic!("expected check command"),
        }
    }

    #[test]
    fn check_requires_email() {
        assert!(Cli::try_parse_from(["collab-admin", "check"]).is_err());
    }
}
