//! Notetaker CLI - Schema setup and account management tools.
//!
//! # Usage
//!
//! ```bash
//! # Create the tables used by the persistent backend
//! notetaker-cli migrate
//!
//! # Create a user
//! notetaker-cli user create -u alice -p hunter2
//!
//! # Register the demo accounts
//! notetaker-cli seed users --file seed/users.yaml
//! ```
//!
//! # Commands
//!
//! - `migrate` - Create users, notes and session tables
//! - `user create` - Register a user
//! - `seed users` - Register every user listed in a YAML file

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "notetaker-cli")]
#[command(author, version, about = "Notetaker CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database tables
    Migrate,
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Register a new user
    Create {
        /// Username
        #[arg(short, long)]
        username: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Register users from a YAML file
    Users {
        /// Path to the YAML file
        #[arg(short, long, default_value = "seed/users.yaml")]
        file: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Create { username, password } => {
                commands::user::create(&username, &password).await?;
            }
        },
        Commands::Seed { target } => match target {
            SeedTarget::Users { file } => commands::seed::users(&file).await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }
}
