//! Application entry point — Site Reporter CLI.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Create [`tokio`] runtime (multi-thread, 2 workers).
//! 4. Build the [`ReportClient`] from config.
//! 5. Submit the narrative/document and stream fragments to stdout as they
//!    arrive, via a [`DocumentObserver`].
//! 6. Optionally hand the finished document, verbatim, to an output file.
//!
//! # Usage
//!
//! ```text
//! site-reporter report <narrative.txt> [--attach photo.jpg] [--out report.md]
//! site-reporter audit <document.pdf> [--out audit.md]
//! ```
//!
//! Pass `-` as the input to read the narrative from stdin.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use site_reporter::{
    config::AppConfig,
    report::{DocumentObserver, ReportAccumulator},
    stream::{ReportClient, ReportSubmission},
};

// ---------------------------------------------------------------------------
// Stdout observer
// ---------------------------------------------------------------------------

/// Prints each fragment the moment it is appended — the CLI's stand-in for
/// a UI's scroll-to-end hook.
struct StdoutObserver;

impl DocumentObserver for StdoutObserver {
    fn appended(&mut self, fragment: &str, _document: &str) {
        print!("{fragment}");
        let _ = std::io::stdout().flush();
    }
}

// ---------------------------------------------------------------------------
// Argument parsing
// ---------------------------------------------------------------------------

enum Command {
    Report {
        input: PathBuf,
        attachment: Option<PathBuf>,
        out: Option<PathBuf>,
    },
    Audit {
        document: PathBuf,
        out: Option<PathBuf>,
    },
}

const USAGE: &str = "usage:\n  \
    site-reporter report <narrative.txt|-> [--attach <file>] [--out <file>]\n  \
    site-reporter audit <document> [--out <file>]";

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Command, String> {
    let command = args.next().ok_or(USAGE)?;
    let input = args.next().map(PathBuf::from).ok_or(USAGE)?;

    let mut attachment = None;
    let mut out = None;
    while let Some(flag) = args.next() {
        match flag.as_str() {
            "--attach" => {
                attachment = Some(PathBuf::from(
                    args.next().ok_or("--attach requires a path")?,
                ));
            }
            "--out" => {
                out = Some(PathBuf::from(args.next().ok_or("--out requires a path")?));
            }
            other => return Err(format!("unknown argument `{other}`\n{USAGE}")),
        }
    }

    match command.as_str() {
        "report" => Ok(Command::Report {
            input,
            attachment,
            out,
        }),
        "audit" => {
            if attachment.is_some() {
                return Err("--attach is only valid for `report`".into());
            }
            Ok(Command::Audit {
                document: input,
                out,
            })
        }
        other => Err(format!("unknown command `{other}`\n{USAGE}")),
    }
}

/// Read the narrative from a file, or from stdin when the path is `-`.
fn read_narrative(path: &Path) -> std::io::Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        std::fs::read_to_string(path)
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Site Reporter starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    let command = match parse_args(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    // 3. Tokio runtime (submission + any future dictation forwarding)
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            log::error!("failed to create tokio runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    // 4. Client + accumulator
    let client = ReportClient::from_config(&config.server);
    let mut sink = ReportAccumulator::with_observer(Box::new(StdoutObserver));

    // 5. Submit and stream
    let (result, out) = match command {
        Command::Report {
            input,
            attachment,
            out,
        } => {
            let report_text = match read_narrative(&input) {
                Ok(text) => text,
                Err(e) => {
                    log::error!("cannot read narrative {}: {e}", input.display());
                    return ExitCode::FAILURE;
                }
            };
            let submission = ReportSubmission {
                report_text,
                attachment,
            };
            (
                rt.block_on(client.submit_report(&submission, &mut sink)),
                out,
            )
        }
        Command::Audit { document, out } => {
            (rt.block_on(client.submit_audit(&document, &mut sink)), out)
        }
    };

    if let Err(e) = result {
        // Partial content is retained; anything already printed stands.
        log::error!("submission failed: {e}");
        return ExitCode::FAILURE;
    }

    // 6. Hand the document, verbatim, to the output file.
    if let Some(path) = out {
        if let Err(e) = std::fs::write(&path, sink.text()) {
            log::error!("failed to write {}: {e}", path.display());
            return ExitCode::FAILURE;
        }
        log::info!("report written to {}", path.display());
    }

    ExitCode::SUCCESS
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
