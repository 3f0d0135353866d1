//! Command handler for a full scan

use super::commands::CliArgs;
use super::output::format_summary;
use crate::collect::{CancellationToken, Collection, Collector};
use crate::config::MonocheckConfig;
use crate::diagnostics::TscDiagnosticSource;
use crate::monorepo::DetectorRegistry;
use crate::output::{ReportFormat, ReportWriter};
use crate::progress::{LoggingHandler, ProgressEvent, ProgressHandler, SpinnerHandler};
use anyhow::{bail, Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_INTERRUPTED: i32 = 130;

/// Environment configuration with command-line overrides applied
pub fn resolve_config(args: &CliArgs) -> Result<MonocheckConfig> {
    let mut config = MonocheckConfig::default();
    if let Some(name) = &args.tsconfig {
        config.tsconfig_name = name.clone();
    }
    if let Some(tsc) = &args.tsc {
        config.tsc_path = Some(tsc.clone());
    }
    if let Some(output) = &args.output {
        config.output = output.clone();
    }
    if let Some(level) = &args.log_level {
        config.log_level = level.to_lowercase();
    }
    config.validate()?;
    Ok(config)
}

/// Run a scan and return the process exit code
pub async fn handle_check(args: &CliArgs, cancel: CancellationToken) -> i32 {
    match run_check(args, cancel).await {
        Ok(collection) if collection.interrupted => EXIT_INTERRUPTED,
        Ok(_) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_FAILURE
        }
    }
}

async fn run_check(args: &CliArgs, cancel: CancellationToken) -> Result<Collection> {
    let config = resolve_config(args)?;
    debug!("{}", config);

    let root = match &args.directory {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    if !root.is_dir() {
        bail!("Not a directory: {}", root.display());
    }

    let progress: Box<dyn ProgressHandler> = if !args.quiet && atty::is(atty::Stream::Stderr) {
        Box::new(SpinnerHandler::new())
    } else {
        Box::new(LoggingHandler)
    };

    let info = DetectorRegistry::with_defaults()
        .detect(&root)
        .with_context(|| format!("Failed to detect workspace at {}", root.display()))?;
    progress.on_progress(&ProgressEvent::DetectionComplete {
        kind: info.kind.to_string(),
        packages: info.packages.len(),
    });

    let source = TscDiagnosticSource::new(info.root_path.clone()).with_executable(config.tsc_path.clone());
    let collector = Collector::new(Arc::new(source))
        .with_config_file_name(config.tsconfig_name.clone())
        .with_cancellation_token(cancel.clone());

    let collection = if cancel.is_cancelled() {
        info!("Interrupted before checking any package");
        Collection {
            interrupted: true,
            units_total: crate::collect::work_units(&info.root_path, &info).len(),
            ..Default::default()
        }
    } else {
        collector
            .collect(&info.root_path, &info, Some(progress.as_ref()))
            .await
    };

    let format = ReportFormat::from(args.format);
    let output = config.output;
    ReportWriter::new(format)
        .write(&collection.records, &output)
        .context("Failed to write report")?;
    info!(path = %output.display(), records = collection.records.len(), "Report written");

    if !args.quiet {
        println!("{}", format_summary(&collection, &output));
    }
    Ok(collection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use serial_test::serial;
    use std::env;
    use std::path::PathBuf;

    #[test]
    #[serial]
    fn test_resolve_config_applies_overrides() {
        env::remove_var("MONOCHECK_TSCONFIG");
        let args = CliArgs::try_parse_from([
            "monocheck",
            "--tsconfig",
            "tsconfig.check.json",
            "-o",
            "out.tsv",
            "--log-level",
            "WARN",
        ])
        .unwrap();

        let config = resolve_config(&args).unwrap();
        assert_eq!(config.tsconfig_name, "tsconfig.check.json");
        assert_eq!(config.output, PathBuf::from("out.tsv"));
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    #[serial]
    fn test_resolve_config_rejects_invalid_level() {
        let args = CliArgs::try_parse_from(["monocheck", "--log-level", "chatty"]).unwrap();
        assert!(resolve_config(&args).is_err());
    }

    #[tokio::test]
    #[serial]
    async fn test_missing_directory_fails() {
        let args = CliArgs::try_parse_from(["monocheck", "/definitely/not/here", "-q"]).unwrap();
        assert_eq!(handle_check(&args, CancellationToken::new()).await, EXIT_FAILURE);
    }

    #[tokio::test]
    #[serial]
    async fn test_interrupted_before_collection() {
        let temp = tempfile::TempDir::new().unwrap();
        let output = temp.path().join("report.tsv");
        let args = CliArgs::try_parse_from([
            "monocheck",
            temp.path().to_str().unwrap(),
            "-q",
            "-o",
            output.to_str().unwrap(),
        ])
        .unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(handle_check(&args, cancel).await, EXIT_INTERRUPTED);
        assert_eq!(std::fs::read_to_string(&output).unwrap().lines().count(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    #[serial]
    async fn test_interrupted_while_checking_only_package() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join("tsconfig.json"), "{}").unwrap();
        std::fs::write(temp.path().join("index.ts"), "export {}").unwrap();
        let tsc = temp.path().join("slow-tsc");
        std::fs::write(&tsc, "#!/bin/sh\nsleep 1\nexit 0\n").unwrap();
        std::fs::set_permissions(&tsc, std::fs::Permissions::from_mode(0o755)).unwrap();

        let output = temp.path().join("report.tsv");
        let args = CliArgs::try_parse_from([
            "monocheck",
            temp.path().to_str().unwrap(),
            "-q",
            "--tsc",
            tsc.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ])
        .unwrap();

        let cancel = CancellationToken::new();
        let requested = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(300)).await;
            requested.cancel();
        });

        assert_eq!(handle_check(&args, cancel).await, EXIT_INTERRUPTED);
        assert!(output.exists());
    }
}
