use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use switchboard::cli::doctor::{self, DoctorOptions};
use switchboard::cli::switch::{self, SwitchOptions};
use switchboard::presets;

#[derive(Parser, Debug)]
#[command(
    name = "switchboard",
    version,
    about = "Switch LLM provider presets for your research agent and smoke-test connectivity"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply a provider preset to the env file (interactive by default).
    Switch {
        /// Preset id to apply without showing the menu (e.g. "openrouter").
        #[arg(long)]
        preset: Option<String>,
        /// Skip the missing-credentials confirmation.
        #[arg(long, short = 'y')]
        yes: bool,
        /// Env file to edit (default: ./.env).
        #[arg(long, env = "SWITCHBOARD_ENV_FILE")]
        env_file: Option<PathBuf>,
    },
    /// Report preset readiness without modifying anything.
    Check {
        /// Env file to inspect (default: ./.env).
        #[arg(long, env = "SWITCHBOARD_ENV_FILE")]
        env_file: Option<PathBuf>,
    },
    /// Smoke-test the configured provider with a live chat completion.
    Doctor {
        /// Also run a sample end-to-end research prompt (slow, costs tokens).
        #[arg(long)]
        research: bool,
        /// Exit non-zero when any check fails.
        #[arg(long)]
        strict: bool,
        /// Env file to load (default: ./.env).
        #[arg(long, env = "SWITCHBOARD_ENV_FILE")]
        env_file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let catalog = presets::catalog();

    match cli.command {
        Command::Switch {
            preset,
            yes,
            env_file,
        } => switch::run(
            &catalog,
            &SwitchOptions {
                preset,
                yes,
                env_file,
            },
        ),
        Command::Check { env_file } => switch::run_check(&catalog, &env_file),
        Command::Doctor {
            research,
            strict,
            env_file,
        } => {
            // The doctor reads the same file the switcher writes; load it
            // into the process environment before resolving configuration.
            match &env_file {
                Some(path) => {
                    let _ = dotenvy::from_path(path);
                }
                None => {
                    let _ = dotenvy::dotenv();
                }
            }
            doctor::run(&DoctorOptions {
                research,
                strict,
                env_file,
            })
            .await
        }
    }
}
