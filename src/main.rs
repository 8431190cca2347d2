// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Operator tool for user records stored in Firestore.

use clap::{Parser, Subcommand};
use std::io::BufRead;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use user_records::{config::Config, db::FirestoreDb, services::UserManager};

/// Inspect and probe user records
#[derive(Parser)]
#[command(name = "user-records")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the first free username derived from BASE
    SuggestUsername { base: String },

    /// Print the public JSON view of a user
    Show { username: String },

    /// Read a password from stdin and check it against a user
    CheckPassword { username: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = Config::from_env()?;
    let db = FirestoreDb::connect(&config.gcp_project_id).await?;
    let manager = UserManager::new(Arc::new(db), &config);

    match cli.command {
        Command::SuggestUsername { base } => {
            let username = manager.find_unique_username(&base).await?;
            println!("{}", username);
        }
        Command::Show { username } => match manager.find_by_username(&username).await? {
            Some(user) => println!("{}", serde_json::to_string_pretty(&user.public_view())?),
            None => anyhow::bail!("User {} not found", username),
        },
        Command::CheckPassword { username } => {
            let mut password = String::new();
            std::io::stdin().lock().read_line(&mut password)?;
            let password = password.trim_end_matches(['\r', '\n']);

            match manager.authenticate_local(&username, password).await? {
                Some(_) => println!("ok"),
                None => {
                    println!("mismatch");
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

/// Initialize structured JSON logging on stderr.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("user_records=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
