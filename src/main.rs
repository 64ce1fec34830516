mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn setup_logging(level: Option<&str>) {
    let level = match level.map(str::to_lowercase).as_deref() {
        Some("trace") => tracing::Level::TRACE,
        Some("debug") => tracing::Level::DEBUG,
        Some("info") => tracing::Level::INFO,
        Some("error") => tracing::Level::ERROR,
        Some("warn") | Some("warning") | None => tracing::Level::WARN,
        Some(other) => {
            eprintln!("Warning: Unknown log level '{other}', defaulting to warn");
            tracing::Level::WARN
        }
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.log_level.as_deref());

    match cli.command {
        Commands::Batch {
            values,
            root,
            suffix,
            exclude,
            dry_run,
        } => commands::batch::run(values, root, suffix, exclude, dry_run),
        Commands::Render {
            input,
            values,
            value_files,
        } => commands::render::run(input, values, value_files),
        Commands::RenderFiles { input, value_files } => {
            commands::render_files::run(input, value_files)
        }
    }
}
