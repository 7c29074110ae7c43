mod config;
mod platform;
mod prompt;
mod server;
mod tools;

use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// review-bridge — tool server that exposes GitLab and GitHub code-review
/// operations (merge requests, diffs, file content, project metadata) plus
/// guided review prompts to an AI agent over stdio.
#[derive(Parser, Debug)]
#[command(name = "review-bridge", version, about)]
struct Cli {
    /// Path to a TOML config file (defaults to .review-bridge.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Stdout carries protocol frames; all diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("loading configuration");
    let config = config::Config::load(cli.config.as_deref())?;

    let platforms = platform::factory::from_config(&config)?;
    if platforms.is_empty() {
        return Err("at least one of GITLAB_TOKEN or GITHUB_TOKEN must be set".into());
    }
    if platforms.gitlab.is_some() {
        info!("GitLab integration enabled");
    }
    if platforms.github.is_some() {
        info!("GitHub integration enabled");
    }

    let guidelines = config.guidelines_override();
    if guidelines.is_some() {
        info!("using custom review guidelines");
    }

    let server = server::ToolServer::new(platforms, guidelines);
    info!(
        tools = server.tool_specs().len(),
        prompts = server.prompt_specs().len(),
        "serving on stdio"
    );
    server.run().await?;

    info!("stdin closed, shutting down");
    Ok(())
}
