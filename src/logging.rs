use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing_appender::non_blocking::{self, WorkerGuard};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};

// Diagnostics share the terminal with the conversation, so only problems
// are shown unless RUST_LOG asks for more.
const DEFAULT_LOG_FILTER: &str = "warn";
const DEFAULT_LOG_FILE_PATH: &str = "logs/tars.log";
const FALLBACK_LOG_FILE_NAME: &str = "tars.log";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

type InitResult = Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LogOutput {
    Stderr,
    File,
    Both,
}

impl LogOutput {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Stderr => "stderr",
            Self::File => "file",
            Self::Both => "both",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct LogSettings {
    format: LogFormat,
    output: LogOutput,
    file_path: PathBuf,
}

impl LogSettings {
    fn from_env_with(mut get_var: impl FnMut(&str) -> Option<String>) -> Self {
        let format = match normalized(get_var("LOG_FORMAT")).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };
        let output = match normalized(get_var("LOG_OUTPUT")).as_deref() {
            Some("file") => LogOutput::File,
            Some("both") => LogOutput::Both,
            _ => LogOutput::Stderr,
        };
        let file_path = get_var("LOG_FILE_PATH")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE_PATH));

        Self {
            format,
            output,
            file_path,
        }
    }
}

fn normalized(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_ascii_lowercase())
}

fn build_file_writer(path: &Path) -> std::io::Result<(non_blocking::NonBlocking, WorkerGuard)> {
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .unwrap_or_else(|| std::ffi::OsStr::new(FALLBACK_LOG_FILE_NAME));

    fs::create_dir_all(dir)?;
    let appender = tracing_appender::rolling::daily(dir, file_name);
    Ok(tracing_appender::non_blocking(appender))
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn install(format: LogFormat, writer: BoxMakeWriter) -> InitResult {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .compact()
            .with_target(false)
            .with_env_filter(env_filter())
            .with_writer(writer)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter())
            .with_writer(writer)
            .try_init(),
    }
}

fn install_with_file(settings: &LogSettings) -> InitResult {
    let include_stderr = settings.output == LogOutput::Both;

    let (file_writer, guard) = match build_file_writer(&settings.file_path) {
        Ok(parts) => parts,
        Err(err) => {
            let fallback = if include_stderr {
                "using stderr only"
            } else {
                "using stderr instead"
            };
            eprintln!(
                "tars: failed to initialize LOG_OUTPUT={} at '{}': {}; {}",
                settings.output.as_str(),
                settings.file_path.display(),
                err,
                fallback
            );
            return install(settings.format, BoxMakeWriter::new(std::io::stderr));
        }
    };

    let writer = if include_stderr {
        BoxMakeWriter::new(std::io::stderr.and(file_writer))
    } else {
        BoxMakeWriter::new(file_writer)
    };
    install(settings.format, writer)?;
    let _ = LOG_GUARD.set(guard);
    Ok(())
}

/// Installs the global subscriber from `RUST_LOG`, `LOG_FORMAT`, `LOG_OUTPUT`
/// and `LOG_FILE_PATH`. A second call is a no-op.
pub fn init() {
    let settings = LogSettings::from_env_with(|key| env::var(key).ok());

    let _ = match settings.output {
        LogOutput::Stderr => install(settings.format, BoxMakeWriter::new(std::io::stderr)),
        LogOutput::File | LogOutput::Both => install_with_file(&settings),
    };
}
