use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use curve_watcher::cli::Args;
use curve_watcher::config::{Settings, WatcherConfig, load_settings_file, locate_config_file};
use curve_watcher::logging::setup_logging;
use curve_watcher::models::ProcessingStats;
use curve_watcher::pipeline::DirectoryWatcher;
use std::process;
use tracing::{error, info};

fn main() {
    let args = Args::parse();

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    match runtime.block_on(run(args)) {
        Ok(stats) => {
            print_summary(&stats);
            process::exit(0);
        }
        Err(error) => {
            eprintln!("{} {:#}", "Error:".bright_red().bold(), error);
            process::exit(1);
        }
    }
}

async fn run(args: Args) -> Result<ProcessingStats> {
    let config_path = locate_config_file(args.config.as_deref());
    let settings = match &config_path {
        Some(path) => load_settings_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Settings::default(),
    };
    let settings = settings.merge(args.settings_overrides());

    setup_logging(args.log_level(), args.quiet, settings.log_dir.as_deref())
        .context("Failed to initialize logging")?;
    match &config_path {
        Some(path) => info!("Loaded configuration from {}", path.display()),
        None => info!("No configuration file found, using command line settings"),
    }

    let config = WatcherConfig::from_settings(settings).context("Invalid configuration")?;
    config.validate().context("Invalid configuration")?;
    config
        .prepare_directories()
        .await
        .context("Failed to prepare output folder")?;

    print_banner(&config);
    info!(
        "Watching {} -> {} (programs {})",
        config.watch_folder.display(),
        config.output_folder.display(),
        config.allow_list
    );

    let shutdown = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => eprintln!("\nReceived CTRL+C, shutting down gracefully..."),
            Err(e) => {
                error!("Failed to install CTRL+C signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    let stats = DirectoryWatcher::new(config).run(shutdown).await?;
    Ok(stats)
}

fn print_banner(config: &WatcherConfig) {
    println!("{}", "Curve watcher started".bright_green().bold());
    println!(
        "  {} {}",
        "Watching:".bright_cyan(),
        config.watch_folder.display()
    );
    println!(
        "  {} {}",
        "Output:".bright_cyan(),
        config.output_folder.display()
    );
    println!("  {} {}", "Programs:".bright_cyan(), config.allow_list);
    println!("  {}", "Press Ctrl+C to stop".bright_black());
}

fn print_summary(stats: &ProcessingStats) {
    println!("\n{}", "Watcher stopped".bright_green().bold());
    println!(
        "  {} {}",
        "Files seen:".bright_cyan(),
        stats.files_seen.to_string().bright_white().bold()
    );
    println!(
        "  {} {}",
        "Converted:".bright_cyan(),
        stats.files_emitted.to_string().bright_white().bold()
    );
    println!(
        "  {} {}",
        "Filtered out:".bright_cyan(),
        stats.filtered_out
    );
    if stats.files_failed() > 0 {
        println!(
            "  {} {} (locked: {}, incomplete: {}, write errors: {})",
            "Failed:".bright_red(),
            stats.files_failed(),
            stats.read_failures,
            stats.incomplete_records,
            stats.write_failures
        );
    }
}
