mod clipboard;
mod config;
mod controller;
mod field;
mod output;
mod report;
mod rules;
mod scope;
mod validate;
mod wizard;

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use clap::Parser;

use crate::clipboard::ClipboardProbe;
use crate::config::Config;
use crate::output::OutputMode;

#[derive(Parser, Debug)]
#[command(name = "qb")]
#[command(about = "Configure a QB Bot website test run")]
struct Args {
    /// Prefill the website URL
    #[arg(long)]
    url: Option<String>,

    /// Where the finished configuration goes (overrides the config file)
    #[arg(long, value_enum)]
    output: Option<OutputMode>,

    /// Read settings from this file instead of the default locations
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write logs here (default: <cache dir>/qbbot/qbbot.log)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print the resolution table and effective settings, then exit
    #[arg(long)]
    debug: bool,
}

fn default_log_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("qbbot").join("qbbot.log"))
}

/// The terminal belongs to the wizard, so logs go to a file.
fn init_logging(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = File::options().create(true).append(true).open(path)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn print_debug(config: &Config) {
    eprintln!("=== Resolutions ===");
    for env in rules::ENVIRONMENTS {
        let entries = rules::resolutions_for(env);
        eprintln!("  {} ({})", env, entries.len());
        for entry in entries {
            eprintln!("    {}", entry);
        }
    }
    eprintln!("=== Settings ===");
    eprintln!("{:#?}", config);
}

fn main() -> io::Result<()> {
    let args = Args::parse();

    if let Some(path) = args.log_file.clone().or_else(default_log_path) {
        if let Err(e) = init_logging(&path) {
            eprintln!("Logging disabled: cannot open {}: {}", path.display(), e);
        }
    }

    let mut config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(mode) = args.output {
        config.output = mode;
    }

    if args.debug {
        print_debug(&config);
        return Ok(());
    }

    let prefilled = args.url.as_deref().map(str::trim).filter(|u| !u.is_empty());
    let probe = if config.clipboard_probe && prefilled.is_none() {
        ClipboardProbe::spawn()
    } else {
        ClipboardProbe::disabled()
    };

    log::info!("starting wizard");
    let today = chrono::Local::now().format("%Y-%m-%d").to_string();

    match wizard::run(config, probe, &today, prefilled)? {
        Some((submission, mode)) => {
            if let Err(e) = output::handle_output(&submission, mode) {
                log::error!("output failed: {}", e);
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        None => {
            // User quit before submitting
            log::info!("wizard closed without submitting");
        }
    }

    Ok(())
}
