//! Wires options, signals, progress display and the engine together.

use std::path::Path;

use fillgen_engine::{
    CancelHandle, FillerChunk, GenerateError, Outcome, ProgressEvent, RunStatus, StreamingWriter,
    WriteFailure,
};
use fillgen_sizing::{FilePreset, PRESETS, ResolveOptions, SizingError, expand_home, format_size};
use serde::Serialize;

use crate::cli::Cli;
use crate::config::Config;
use crate::progress::{GenerationProgress, format_duration};

pub const EXIT_OK: u8 = 0;
pub const EXIT_USAGE: u8 = 2;
pub const EXIT_CREATE_FAILED: u8 = 3;
pub const EXIT_WRITE_FAILED: u8 = 4;
pub const EXIT_OUT_OF_SPACE: u8 = 5;
pub const EXIT_CANCELLED: u8 = 130;

/// Prints the preset table.
pub fn list_types(json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(PRESETS)?);
        return Ok(());
    }
    println!("Available file types:");
    for preset in PRESETS {
        println!("  {:<6} .{:<6} {}", preset.name, preset.extension, preset.description);
    }
    Ok(())
}

/// One line of `--json` output.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum JsonLine<'a> {
    Progress(ProgressEvent),
    Summary(RunSummary<'a>),
}

/// Final record of a run in `--json` mode.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunSummary<'a> {
    status: RunStatus,
    path: String,
    bytes_written: u64,
    final_size_on_disk: Option<u64>,
    elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    cause: Option<WriteFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cleanup_error: Option<&'a str>,
}

impl<'a> RunSummary<'a> {
    fn new(outcome: &'a Outcome, path: &Path) -> Self {
        Self {
            status: outcome.status,
            path: path.display().to_string(),
            bytes_written: outcome.bytes_written,
            final_size_on_disk: outcome.final_size_on_disk,
            elapsed_ms: outcome.elapsed.as_millis() as u64,
            cause: outcome.error.as_ref().and_then(GenerateError::write_failure),
            error: outcome.error.as_ref().map(ToString::to_string),
            warnings: outcome.warnings.iter().map(ToString::to_string).collect(),
            cleanup_error: outcome.cleanup.as_ref().and_then(|c| c.error.as_deref()),
        }
    }
}

fn print_json(line: &JsonLine<'_>) {
    match serde_json::to_string(line) {
        Ok(text) => println!("{text}"),
        Err(e) => tracing::warn!(error = %e, "cannot encode json output"),
    }
}

/// Merges command line and config into resolver options.
pub fn build_options(cli: &Cli, config: &Config) -> Result<ResolveOptions, SizingError> {
    let size = cli.size.clone().unwrap_or_default();
    let output_dir = match &cli.output {
        Some(dir) => dir.clone(),
        None => expand_home(&config.output_dir),
    };
    let preset_name = cli.file_type.as_deref().unwrap_or(&config.default_type);

    let mut options = ResolveOptions::new(size, output_dir);
    options.preset = FilePreset::from_name(preset_name)?;
    options.name = cli.name.clone();
    options.chunk_size = Some(
        cli.chunk_size
            .clone()
            .unwrap_or_else(|| config.chunk_size.clone()),
    );
    Ok(options)
}

/// Runs one generation and maps its outcome to an exit code.
pub async fn run(cli: Cli, config: Config) -> anyhow::Result<u8> {
    let options = match build_options(&cli, &config) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("error: {e}");
            return Ok(sizing_exit_code(&e));
        }
    };
    let request = match fillgen_sizing::resolve(&options) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return Ok(sizing_exit_code(&e));
        }
    };

    let path = request.destination().to_path_buf();
    let total = request.total_bytes();
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let chunk = FillerChunk::build(request.chunk_size())?;
    let cancel = CancelHandle::new();
    let mut writer = StreamingWriter::new(request, chunk)?.with_cancel_handle(cancel.clone());

    let progress = GenerationProgress::new(total, &file_name, cli.quiet || cli.json);
    if cli.json {
        writer.on_progress(Box::new(|event| print_json(&JsonLine::Progress(event))));
    } else {
        let bar = progress.clone();
        writer.on_progress(Box::new(move |event| bar.update(event)));
    }

    let signals = tokio::spawn(watch_signals(cancel));
    let outcome = writer.run().await;
    signals.abort();

    let code = exit_code(&outcome);
    if cli.json {
        print_json(&JsonLine::Summary(RunSummary::new(&outcome, &path)));
    } else {
        report(&outcome, &path, &progress, cli.quiet);
    }
    Ok(code)
}

/// Cancels the run on SIGINT (and SIGTERM on Unix).
///
/// Only flips the cancellation flag; the engine does the cleanup.
async fn watch_signals(cancel: CancelHandle) {
    loop {
        wait_for_interrupt().await;
        if cancel.request_cancel() {
            tracing::info!("interrupt received, cancelling");
        } else {
            tracing::debug!("interrupt received, already cancelling");
        }
    }
}

#[cfg(unix)]
async fn wait_for_interrupt() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut term = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, "cannot listen for SIGTERM");
            return ctrl_c().await;
        }
    };
    tokio::select! {
        _ = ctrl_c() => {}
        _ = term.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_interrupt() {
    ctrl_c().await;
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

fn report(outcome: &Outcome, path: &Path, progress: &GenerationProgress, quiet: bool) {
    match outcome.status {
        RunStatus::Completed => {
            progress.finish_with_message(format!("Generated: {}", path.display()));
            for warning in &outcome.warnings {
                eprintln!("warning: {warning}");
            }
            if !quiet {
                println!("File:    {}", path.display());
                println!("Size:    {}", format_size(outcome.bytes_written));
                println!("Elapsed: {}", format_duration(outcome.elapsed));
                println!(
                    "Speed:   {}/s",
                    format_size(outcome.bytes_per_second() as u64)
                );
            }
        }
        RunStatus::Cancelled => {
            progress.abandon_with_message("Cancelled".to_string());
            eprintln!("cancelled");
        }
        RunStatus::Failed | RunStatus::Running => {
            progress.abandon_with_message("Failed".to_string());
            if let Some(err) = &outcome.error {
                eprintln!("error: {err}");
            }
        }
    }

    if let Some(cleanup) = &outcome.cleanup {
        if let Some(err) = &cleanup.error {
            eprintln!("warning: could not remove {}: {err}", path.display());
        }
    }
}

/// Exit code for a finished run.
pub fn exit_code(outcome: &Outcome) -> u8 {
    match outcome.status {
        RunStatus::Completed => EXIT_OK,
        RunStatus::Cancelled => EXIT_CANCELLED,
        RunStatus::Failed | RunStatus::Running => match &outcome.error {
            Some(err) => error_exit_code(err),
            None => EXIT_WRITE_FAILED,
        },
    }
}

fn error_exit_code(err: &GenerateError) -> u8 {
    match err {
        GenerateError::InvalidConfiguration(_) => EXIT_USAGE,
        GenerateError::CreateFailed { .. } => EXIT_CREATE_FAILED,
        GenerateError::WriteFailed {
            cause: WriteFailure::OutOfSpace,
            ..
        } => EXIT_OUT_OF_SPACE,
        GenerateError::WriteFailed { .. } => EXIT_WRITE_FAILED,
        GenerateError::Cancelled => EXIT_CANCELLED,
    }
}

/// Exit code for an option that failed to resolve.
pub fn sizing_exit_code(err: &SizingError) -> u8 {
    match err {
        SizingError::DirectoryNotWritable { .. } => EXIT_CREATE_FAILED,
        SizingError::Engine(e) => error_exit_code(e),
        _ => EXIT_USAGE,
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;

    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("fillgen").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn options_prefer_cli_over_config() {
        let config = Config {
            output_dir: "/from/config".into(),
            chunk_size: "2MiB".into(),
            default_type: "iso".into(),
        };
        let opts = build_options(
            &cli(&["5MB", "-o", "/from/cli", "-t", "pdf", "--chunk-size", "512KiB"]),
            &config,
        )
        .unwrap();
        assert_eq!(opts.output_dir, PathBuf::from("/from/cli"));
        assert_eq!(opts.preset.extension, "pdf");
        assert_eq!(opts.chunk_size.as_deref(), Some("512KiB"));
    }

    #[test]
    fn options_fall_back_to_config() {
        let config = Config {
            output_dir: "/from/config".into(),
            chunk_size: "2MiB".into(),
            default_type: "iso".into(),
        };
        let opts = build_options(&cli(&["5MB"]), &config).unwrap();
        assert_eq!(opts.output_dir, PathBuf::from("/from/config"));
        assert_eq!(opts.preset.extension, "iso");
        assert_eq!(opts.chunk_size.as_deref(), Some("2MiB"));
    }

    #[test]
    fn unknown_type_is_usage_error() {
        let err = build_options(&cli(&["5MB", "-t", "docx"]), &Config::default()).unwrap_err();
        assert_eq!(sizing_exit_code(&err), EXIT_USAGE);
    }

    #[test]
    fn sizing_errors_map_to_codes() {
        let err = SizingError::OutOfBounds {
            bytes: 1,
            min: 2,
            max: 3,
        };
        assert_eq!(sizing_exit_code(&err), EXIT_USAGE);
        let err = SizingError::DirectoryNotWritable {
            path: PathBuf::from("/x"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert_eq!(sizing_exit_code(&err), EXIT_CREATE_FAILED);
    }

    #[tokio::test]
    async fn completed_run_exits_zero() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().to_string_lossy().into_owned();
        let code = run(cli(&["1MiB", "-o", &out, "-n", "fixture", "-q"]), Config::default())
            .await
            .unwrap();
        assert_eq!(code, EXIT_OK);
        let written = std::fs::metadata(tmp.path().join("fixture.bin")).unwrap();
        assert_eq!(written.len(), 1024 * 1024);
    }

    #[tokio::test]
    async fn too_small_size_exits_with_usage() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().to_string_lossy().into_owned();
        let code = run(cli(&["10KB", "-o", &out, "-q"]), Config::default())
            .await
            .unwrap();
        assert_eq!(code, EXIT_USAGE);
    }

    #[tokio::test]
    async fn summary_json_describes_outcome() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("summary.bin");
        let req = fillgen_engine::GenerationRequest::new(&path, 2048, 1024).unwrap();
        let writer = StreamingWriter::new(req, FillerChunk::build(1024).unwrap()).unwrap();
        let mut outcome = writer.run().await;

        let json = serde_json::to_value(JsonLine::Summary(RunSummary::new(&outcome, &path)))
            .unwrap();
        assert_eq!(json["type"], "summary");
        assert_eq!(json["status"], "completed");
        assert_eq!(json["bytesWritten"], 2048);
        assert_eq!(json["finalSizeOnDisk"], 2048);
        assert!(json.get("cause").is_none());

        outcome.status = RunStatus::Failed;
        outcome.error = Some(GenerateError::write_failed(std::io::Error::from(
            std::io::ErrorKind::StorageFull,
        )));
        let json = serde_json::to_value(JsonLine::Summary(RunSummary::new(&outcome, &path)))
            .unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["cause"], "out_of_space");
    }

    #[test]
    fn progress_json_line_is_tagged() {
        let event = ProgressEvent {
            percent: 40,
            bytes_written: 400,
            total_bytes: 1000,
        };
        let json = serde_json::to_value(JsonLine::Progress(event)).unwrap();
        assert_eq!(json["type"], "progress");
        assert_eq!(json["percent"], 40);
        assert_eq!(json["bytesWritten"], 400);
    }

    #[test]
    fn preset_table_serializes() {
        let json = serde_json::to_value(PRESETS).unwrap();
        assert_eq!(json[0]["name"], "bin");
        assert_eq!(json[0]["extension"], "bin");
    }

    #[tokio::test]
    async fn out_of_space_exit_code() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("x.bin");
        let req = fillgen_engine::GenerationRequest::new(&path, 1024, 1024).unwrap();
        let writer = StreamingWriter::new(req, FillerChunk::build(1024).unwrap()).unwrap();
        let mut outcome = writer.run().await;
        assert_eq!(exit_code(&outcome), EXIT_OK);

        outcome.status = RunStatus::Failed;
        outcome.error = Some(GenerateError::write_failed(std::io::Error::from(
            std::io::ErrorKind::StorageFull,
        )));
        assert_eq!(exit_code(&outcome), EXIT_OUT_OF_SPACE);

        outcome.status = RunStatus::Cancelled;
        assert_eq!(exit_code(&outcome), EXIT_CANCELLED);
    }
}
