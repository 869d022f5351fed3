use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod commands;
mod formatter;
mod generate;
mod interactive_app;
mod session;
mod spinner;

use crate::generate::GenerateArgs;
use crate::interactive_app::InteractiveApp;
use crate::session::SessionOptions;

#[derive(Parser, Debug)]
#[command(name = "vivaldino")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Vivaldino - narrative scripts and narration from the terminal")]
struct Args {
    /// Load settings from a specific file
    #[arg(long, value_name = "PATH", global = true)]
    settings: Option<PathBuf>,

    /// Load settings from a specific profile (~/.vivaldino/settings_NAME.toml)
    #[arg(long, value_name = "NAME", global = true, conflicts_with = "settings")]
    profile: Option<String>,

    /// Use this configured provider instead of the active one
    #[arg(long, value_name = "NAME", global = true)]
    provider: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a script once and exit
    Generate(GenerateArgs),
}

fn main() -> Result<()> {
    setup_tracing()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let local = tokio::task::LocalSet::new();
        local.run_until(async_main()).await
    })
}

async fn async_main() -> Result<()> {
    let args = Args::parse();

    info!(
        "CLI startup: settings={:?}, profile={:?}, provider={:?}, command={:?}",
        args.settings, args.profile, args.provider, args.command
    );

    let options = SessionOptions {
        settings_path: args.settings,
        profile: args.profile,
        provider: args.provider,
    };

    match args.command {
        Some(Command::Generate(generate_args)) => generate::run(options, generate_args).await,
        None => {
            let mut app = InteractiveApp::new(options)?;
            app.run().await
        }
    }
}

fn setup_tracing() -> Result<()> {
    use std::fs;
    use tracing_subscriber::fmt;

    // Create trace directory in user's home
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/tmp"));
    let trace_dir = home.join(".vivaldino").join("trace");
    fs::create_dir_all(&trace_dir)?;

    let log_file = trace_dir.join("vivaldino.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)?;

    // Setup tracing subscriber with file output
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(file)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Tracing initialized to {:?}", log_file);
    Ok(())
}
