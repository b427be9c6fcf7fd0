use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Environment variable holding an `EnvFilter` directive for the extension.
pub const LOG_FILTER_ENV: &str = "BLINKENLIGHTS_SHELLEXT_LOG";

static INIT: OnceLock<()> = OnceLock::new();

/// Configuration for the logging system
pub struct LogConfig {
    /// Directory where log files will be stored
    pub log_dir: PathBuf,
    /// Prefix for log file names
    pub file_prefix: String,
    /// Maximum number of log files to keep (rotation)
    pub max_files: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        let log_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("Blinkenlights Image Converter")
            .join("logs");

        Self {
            log_dir,
            file_prefix: "shellext".to_string(),
            max_files: 5,
        }
    }
}

/// Initialize file logging for the extension.
///
/// The DLL runs inside `explorer.exe`, so there is no console layer: events go
/// to a daily rolling JSON file only. Writes are synchronous because the host
/// may unload the module at any time and a background writer would lose the
/// tail of the log.
///
/// # Log Targets
/// - `dll` - DLL exports and self-registration
/// - `shellext::factory` - Class factory
/// - `shellext::context_menu` - Selection admission, menu building, dispatch
/// - `selection` - Selection capture and eligibility
/// - `launcher` - Converter lookup and process start
/// - `main` - Logging and locale setup
///
/// # Example
/// ```bat
/// set BLINKENLIGHTS_SHELLEXT_LOG=shellext=debug,launcher=trace
/// ```
pub fn init_logging(config: LogConfig) -> Result<()> {
    std::fs::create_dir_all(&config.log_dir).context("Failed to create log directory")?;

    let file_appender = tracing_appender::rolling::RollingFileAppender::builder()
        .rotation(tracing_appender::rolling::Rotation::DAILY)
        .filename_prefix(&config.file_prefix)
        .filename_suffix("log")
        .max_log_files(config.max_files)
        .build(&config.log_dir)
        .context("Failed to create file appender")?;

    let env_filter = EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = fmt::layer()
        .json()
        .with_writer(file_appender)
        .with_target(true)
        .with_thread_ids(true)
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .try_init()
        .context("Failed to install log subscriber")?;

    tracing::info!(
        target: "main",
        log_dir = %config.log_dir.display(),
        max_files = config.max_files,
        "Logging system initialized"
    );

    Ok(())
}

/// Logging and locale setup, once per process. Failures are swallowed: the
/// menu must keep working without a log.
pub fn init_once() {
    INIT.get_or_init(|| {
        let _ = init_logging(LogConfig::default());
        crate::init_locale();
    });
}
