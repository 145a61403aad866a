//! Rolling file logs for bloom runs.
//!
//! # Responsibility
//! - Start one flexi_logger file sink per process for the pipeline events
//!   (`event=analyze`, `event=embed_batches`, `event=cli_run` and others).
//! - Record panics as a single metadata-only `event=panic` line.
//!
//! # Invariants
//! - A second `init_logging` with the same level and directory is a no-op.
//! - A second `init_logging` with a different level or directory fails with
//!   `LoggingError::Conflict`; the running sink is never swapped.
//! - Analyzed text never reaches the log; events carry counts and labels.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

const LOG_BASENAME: &str = "neural_bloom";
const ROTATE_AT_BYTES: u64 = 4 * 1024 * 1024;
const KEEP_ROTATED: usize = 3;
const PANIC_MESSAGE_CHARS: usize = 120;

static ACTIVE: OnceCell<ActiveSink> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

/// Verbosity accepted by `init_logging`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = LoggingError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(LoggingError::UnsupportedLevel(raw.trim().to_string())),
        }
    }
}

/// Error for logging setup.
#[derive(Debug)]
pub enum LoggingError {
    UnsupportedLevel(String),
    RelativeDir(PathBuf),
    /// A sink is already running with other settings.
    Conflict {
        active: (LogLevel, PathBuf),
        requested: (LogLevel, PathBuf),
    },
    CreateDir {
        dir: PathBuf,
        source: std::io::Error,
    },
    Backend(String),
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLevel(raw) => write!(
                f,
                "unsupported log level `{raw}`; expected trace|debug|info|warn|error"
            ),
            Self::RelativeDir(dir) => {
                write!(f, "log directory must be absolute, got `{}`", dir.display())
            }
            Self::Conflict { active, requested } => write!(
                f,
                "logging already runs at level `{}` in `{}`; refusing level `{}` in `{}`",
                active.0,
                active.1.display(),
                requested.0,
                requested.1.display()
            ),
            Self::CreateDir { dir, source } => {
                write!(f, "cannot create log directory `{}`: {source}", dir.display())
            }
            Self::Backend(err) => write!(f, "logger backend failed: {err}"),
        }
    }
}

impl Error for LoggingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDir { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<flexi_logger::FlexiLoggerError> for LoggingError {
    fn from(value: flexi_logger::FlexiLoggerError) -> Self {
        Self::Backend(value.to_string())
    }
}

struct ActiveSink {
    level: LogLevel,
    dir: PathBuf,
    _handle: LoggerHandle,
}

/// Starts the rolling file sink under `log_dir`.
///
/// # Errors
/// - `RelativeDir` for an empty or relative directory.
/// - `Conflict` when a sink with other settings is already running.
/// - `CreateDir` / `Backend` when the sink cannot be started.
pub fn init_logging(level: LogLevel, log_dir: &Path) -> Result<(), LoggingError> {
    if log_dir.as_os_str().is_empty() || !log_dir.is_absolute() {
        return Err(LoggingError::RelativeDir(log_dir.to_path_buf()));
    }

    let sink = ACTIVE.get_or_try_init(|| start_sink(level, log_dir))?;
    if sink.level != level || sink.dir != log_dir {
        return Err(LoggingError::Conflict {
            active: (sink.level, sink.dir.clone()),
            requested: (level, log_dir.to_path_buf()),
        });
    }
    Ok(())
}

/// Level and directory of the running sink, if any.
pub fn logging_status() -> Option<(LogLevel, PathBuf)> {
    ACTIVE.get().map(|sink| (sink.level, sink.dir.clone()))
}

/// `Debug` for debug builds, `Info` otherwise.
pub fn default_log_level() -> LogLevel {
    if cfg!(debug_assertions) {
        LogLevel::Debug
    } else {
        LogLevel::Info
    }
}

fn start_sink(level: LogLevel, dir: &Path) -> Result<ActiveSink, LoggingError> {
    std::fs::create_dir_all(dir).map_err(|source| LoggingError::CreateDir {
        dir: dir.to_path_buf(),
        source,
    })?;

    let handle = Logger::try_with_str(level.as_str())?
        .log_to_file(FileSpec::default().directory(dir).basename(LOG_BASENAME))
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_ROTATED),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()?;

    PANIC_HOOK.get_or_init(install_panic_hook);

    info!(
        "event=logging_init module=logging status=ok version={} level={} embedding_dim={}",
        env!("CARGO_PKG_VERSION"),
        level,
        crate::model::analysis::EMBEDDING_DIM
    );

    Ok(ActiveSink {
        level,
        dir: dir.to_path_buf(),
        _handle: handle,
    })
}

fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map_or_else(|| "unknown".to_string(), |loc| format!("{}:{}", loc.file(), loc.line()));
        // Payloads may echo analyzed text.
        let message = panic_info
            .payload()
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
            .map_or_else(|| "opaque".to_string(), |m| one_line(&m, PANIC_MESSAGE_CHARS));
        error!("event=panic module=logging status=error location={location} message={message}");
        previous(panic_info);
    }));
}

/// Flattens `value` to one line of at most `max_chars` characters.
fn one_line(value: &str, max_chars: usize) -> String {
    let mut chars = value.chars().map(|c| if c == '\n' || c == '\r' { ' ' } else { c });
    let mut line: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        line.push('…');
    }
    line
}

#[cfg(test)]
mod tests {
    use super::{init_logging, logging_status, one_line, LogLevel, LoggingError};
    use std::path::{Path, PathBuf};

    fn kept_temp_dir(prefix: &str) -> PathBuf {
        tempfile::Builder::new()
            .prefix(prefix)
            .keep(true)
            .tempdir()
            .expect("temp dir should be created")
            .path()
            .to_path_buf()
    }

    #[test]
    fn level_parsing_is_case_insensitive() {
        assert_eq!(" WARNING ".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("Info".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert!(matches!(
            "verbose".parse::<LogLevel>(),
            Err(LoggingError::UnsupportedLevel(raw)) if raw == "verbose"
        ));
    }

    #[test]
    fn relative_or_empty_dir_is_rejected() {
        assert!(matches!(
            init_logging(LogLevel::Info, Path::new("logs/dev")),
            Err(LoggingError::RelativeDir(_))
        ));
        assert!(matches!(
            init_logging(LogLevel::Info, Path::new("")),
            Err(LoggingError::RelativeDir(_))
        ));
    }

    #[test]
    fn one_line_flattens_and_truncates() {
        assert_eq!(one_line("I love this!\nDo you?\r", 8), "I love t…");
        assert_eq!(one_line("calm", 8), "calm");
    }

    #[test]
    fn second_init_is_noop_or_conflict() {
        let dir = kept_temp_dir("neural-bloom-logs");
        let other = kept_temp_dir("neural-bloom-other");

        init_logging(LogLevel::Info, &dir).expect("first init should succeed");
        init_logging(LogLevel::Info, &dir).expect("same settings should be a no-op");

        let err = init_logging(LogLevel::Debug, &dir).unwrap_err();
        assert!(matches!(err, LoggingError::Conflict { .. }));
        assert!(err.to_string().contains("refusing level `debug`"));
        assert!(matches!(
            init_logging(LogLevel::Info, &other),
            Err(LoggingError::Conflict { .. })
        ));

        assert_eq!(logging_status(), Some((LogLevel::Info, dir)));
    }
}
