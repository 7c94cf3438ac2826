//! Tracing configuration and log routing.
//!
//! The server logs to stdout using a compact formatter and appends to a log file. When
//! `DOCDIGEST_LOG_FILE` is set, logs go to that path; otherwise a file logger is created under
//! `logs/docdigest.log`. The CLI logs to stderr only, leaving stdout for its JSON report.
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

const LOG_FILE_ENV: &str = "DOCDIGEST_LOG_FILE";
const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_LOG_FILE: &str = "docdigest.log";

fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Install the server subscriber: compact stdout plus, when the file opens, an ANSI-free file
/// layer with targets. `RUST_LOG` overrides the default `info` filter.
pub fn init_tracing() {
    let file_layer = configure_file_writer().map(|writer| {
        fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_ansi(false)
            .compact()
    });

    tracing_subscriber::registry()
        .with(env_filter("info"))
        .with(fmt::layer().with_target(false).compact())
        .with(file_layer)
        .init();
}

/// Configure a stderr-only subscriber for command-line use (defaults to `warn`).
pub fn init_cli_tracing() {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter("warn"))
        .with(stderr_layer)
        .init();
}

/// Split the configured log path into the directory to create and the file to append to.
///
/// Without an override the server writes `logs/docdigest.log`; a bare file name lands in the
/// working directory.
fn log_file_location(override_path: Option<OsString>) -> (PathBuf, OsString) {
    let Some(path) = override_path.map(PathBuf::from) else {
        return (PathBuf::from(DEFAULT_LOG_DIR), DEFAULT_LOG_FILE.into());
    };
    let directory = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let file_name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| DEFAULT_LOG_FILE.into());
    (directory, file_name)
}

/// Open a non-rotating appender for the server log, or `None` when the file cannot be used.
fn configure_file_writer() -> Option<NonBlocking> {
    let (directory, file_name) = log_file_location(std::env::var_os(LOG_FILE_ENV));
    let appender = std::fs::create_dir_all(&directory)
        .map_err(|error| error.to_string())
        .and_then(|()| {
            RollingFileAppender::builder()
                .rotation(Rotation::NEVER)
                .filename_prefix(file_name.to_string_lossy())
                .build(&directory)
                .map_err(|error| error.to_string())
        });

    match appender {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = LOG_GUARD.set(guard);
            Some(writer)
        }
        Err(error) => {
            eprintln!(
                "File logging disabled; cannot open {}: {error}",
                directory.join(&file_name).display()
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_logs_directory() {
        let (directory, file_name) = log_file_location(None);
        assert_eq!(directory, PathBuf::from("logs"));
        assert_eq!(file_name, OsString::from("docdigest.log"));
    }

    #[test]
    fn override_splits_directory_and_file() {
        let (directory, file_name) =
            log_file_location(Some(OsString::from("/var/log/docdigest/server.log")));
        assert_eq!(directory, PathBuf::from("/var/log/docdigest"));
        assert_eq!(file_name, OsString::from("server.log"));
    }

    #[test]
    fn bare_file_name_uses_working_directory() {
        let (directory, file_name) = log_file_location(Some(OsString::from("digest.log")));
        assert_eq!(directory, PathBuf::from("."));
        assert_eq!(file_name, OsString::from("digest.log"));
    }
}
