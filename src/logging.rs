//! File logging. The terminal belongs to the UI, so tracing output goes to a
//! plain log file in the data directory.

use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(thiserror::Error, Debug)]
pub enum LoggingError {
    #[error("log file: {0}")]
    Io(#[from] io::Error),
    #[error("invalid log filter: {0}")]
    Filter(#[from] ParseError),
    #[error("log path {0} has no file name")]
    Path(String),
    #[error("logger already installed: {0}")]
    Init(String),
}

/// Installs the global subscriber. `RUST_LOG` overrides `default_level`.
/// Buffered lines are flushed when the returned guard is dropped.
pub fn init(log_file: &Path, default_level: &str) -> Result<WorkerGuard, LoggingError> {
    let file_name = log_file
        .file_name()
        .ok_or_else(|| LoggingError::Path(log_file.display().to_string()))?;
    let dir = log_file
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_level)?,
    };
    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|error| LoggingError::Init(error.to_string()))?;
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_without_file_name_is_rejected() {
        let Err(error) = init(Path::new("/"), "info") else {
            panic!("root has no file name");
        };
        assert!(matches!(error, LoggingError::Path(_)));
    }

    #[test]
    fn test_bad_filter_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let Err(error) = init(&dir.path().join("x.log"), "pokedex=verbose") else {
            panic!("filter should be rejected");
        };
        assert!(matches!(error, LoggingError::Filter(_)));
    }
}
