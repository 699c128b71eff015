//! Tracing setup shared by the engine's binaries.
//!
//! Batch workers are named `jm-match-<n>`, so thread names are always part of
//! the output. A panic inside a pair is caught by the batch and reported on
//! that pair; the hook below only makes sure it also reaches the log.

use std::panic;
use std::path::PathBuf;
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

const DEFAULT_FILTER: &str = "info";

/// Logging knobs read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// `JM_LOG_DIR`: write `<dir>/<app>.log`, rotated daily, instead of stderr.
    pub dir: Option<PathBuf>,
    /// `JM_LOG_INCLUDE_BACKTRACE`: also run the default panic hook.
    pub include_backtrace: bool,
    /// `RUST_LOG`, else `JM_LOG_LEVEL`, else `info`.
    pub filter: String,
}

impl LogSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        Self {
            dir: non_empty("JM_LOG_DIR").map(PathBuf::from),
            include_backtrace: non_empty("JM_LOG_INCLUDE_BACKTRACE")
                .is_some_and(|value| value == "1" || value.eq_ignore_ascii_case("true")),
            filter: non_empty("RUST_LOG")
                .or_else(|| non_empty("JM_LOG_LEVEL"))
                .unwrap_or_else(|| DEFAULT_FILTER.to_string()),
        }
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

fn panic_text(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "panic payload not string".into())
}

/// Route panics through `tracing` with thread and location. Installed once
/// per process.
pub fn install_tracing_panic_hook(app_name: &'static str) {
    static INSTALLED: OnceLock<()> = OnceLock::new();

    INSTALLED.get_or_init(|| {
        let default_hook = panic::take_hook();
        let include_backtrace = LogSettings::from_env().include_backtrace;

        panic::set_hook(Box::new(move |info| {
            let thread = std::thread::current();
            let location = info
                .location()
                .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()));

            tracing::error!(
                application = app_name,
                thread_name = thread.name().unwrap_or("unknown"),
                location = location.as_deref().unwrap_or("unknown"),
                panic_message = %panic_text(info.payload()),
                "panic captured"
            );

            if include_backtrace {
                default_hook(info);
            }
        }));
    });
}

fn rotating_file_writer(app_name: &'static str, settings: &LogSettings) -> Option<BoxMakeWriter> {
    let dir = settings.dir.as_ref()?;
    if let Err(err) = std::fs::create_dir_all(dir) {
        tracing::warn!(error = %err, dir = %dir.display(), "cannot create JM_LOG_DIR; logging to stderr");
        return None;
    }

    let appender = tracing_appender::rolling::daily(dir, format!("{app_name}.log"));
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);
    let _ = LOG_GUARD.set(guard);
    Some(BoxMakeWriter::new(non_blocking))
}

/// Installs the global fmt subscriber. Stdout stays free for command output.
pub fn init_tracing_subscriber(app_name: &'static str) {
    let settings = LogSettings::from_env();
    let builder = tracing_subscriber::fmt()
        .with_env_filter(settings.env_filter())
        .with_thread_names(true);

    let _ = match rotating_file_writer(app_name, &settings) {
        Some(writer) => builder.with_writer(writer).with_ansi(false).try_init(),
        None => builder.with_writer(std::io::stderr).try_init(),
    };
}
