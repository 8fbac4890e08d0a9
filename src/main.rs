//! drive-mirror CLI - Mirror a local directory into Google Drive.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use drive_mirror::{
    extract_folder_id, mirror, DriveClient, FileOutcome, MirrorError, MirrorOptions,
    MirrorReport, Progress,
};

/// Upload a directory, and every directory below it, to Google Drive.
#[derive(Parser)]
#[command(name = "drive-mirror")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Local directory to mirror.
    #[arg(long, short = 'l', env = "DRIVE_MIRROR_LOCAL_DIR")]
    local_directory: PathBuf,

    /// Path to service account or authorized user JSON credentials file.
    #[arg(long, env = "GOOGLE_APPLICATION_CREDENTIALS")]
    credentials: PathBuf,

    /// Drive folder URL or ID to mirror into. Defaults to My Drive's root.
    #[arg(long, short = 'p', env = "DRIVE_MIRROR_PARENT")]
    parent: Option<String>,

    /// Number of uploads in flight within one directory.
    #[arg(long, short = 'j', default_value_t = 1)]
    jobs: usize,

    /// Exit with a non-zero code if any folder or file failed.
    #[arg(long)]
    strict: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn validate(&self) -> Result<()> {
        if !self.local_directory.is_dir() {
            anyhow::bail!("Not a directory: {:?}", self.local_directory);
        }
        if !self.credentials.is_file() {
            anyhow::bail!("Credentials file not found: {:?}", self.credentials);
        }
        if self.jobs == 0 {
            anyhow::bail!("--jobs must be at least 1");
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    cli.validate()?;

    let parent = cli
        .parent
        .as_deref()
        .map(extract_folder_id)
        .transpose()
        .context("Invalid parent folder")?;

    let root = cli
        .local_directory
        .canonicalize()
        .with_context(|| format!("Failed to resolve {:?}", cli.local_directory))?;

    let client = DriveClient::connect(&cli.credentials)
        .await
        .with_context(|| format!("Failed to authenticate with {:?}", cli.credentials))?;

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

    let (progress, mut events) = mpsc::unbounded_channel();
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            print_progress(&event);
        }
    });

    let options = MirrorOptions {
        parent,
        jobs: cli.jobs,
        cancel,
        progress: Some(progress),
    };

    println!(
        "Mirroring {} to {}...",
        root.display(),
        options.parent.as_deref().unwrap_or("My Drive")
    );
    let report = mirror(&client, &root, &options).await;

    // Closing the sender lets the printer drain and stop.
    drop(options);
    printer.await.context("Progress printer panicked")?;
    print_summary(&report);

    if cli.strict && !report.is_success() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

async fn cancel_on_ctrl_c(token: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        warn!("Interrupted, finishing in-flight uploads");
        token.cancel();
    }
}

fn print_progress(event: &Progress) {
    let filename = event.path.file_name().unwrap_or_default().to_string_lossy();
    match &event.outcome {
        FileOutcome::Uploaded { id } => println!(
            "[{}/{}] Uploading {}... OK ({})",
            event.index, event.total, filename, id
        ),
        FileOutcome::Failed { error } => {
            println!(
                "[{}/{}] Uploading {}... FAILED",
                event.index, event.total, filename
            );
            eprintln!("  Error: {}", error);
        }
    }
}

fn print_summary(report: &MirrorReport) {
    println!(
        "{} folder(s) created, {} file(s) uploaded, {} failure(s).",
        report.folders_created,
        report.files.len(),
        report.failure_count()
    );
    if report.directories_skipped > 0 {
        println!(
            "{} directory(ies) skipped below failed folders.",
            report.directories_skipped
        );
    }
    // Upload failures were already shown next to their progress line.
    for failure in &report.failures {
        if !matches!(failure, MirrorError::FileUpload { .. }) {
            eprintln!("  Error: {}", failure);
        }
    }
    if report.cancelled {
        println!("Cancelled before completion.");
    } else {
        println!("Done.");
    }
}
