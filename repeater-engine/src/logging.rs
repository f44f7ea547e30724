use serde::{Deserialize, Serialize};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};
use crate::error::{RepeaterError, RepeaterResult};

/// Logging configuration for the repeater engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Whether to enable JSON formatted logs
    pub json_format: bool,

    /// Whether to include thread names in logs
    pub include_thread_names: bool,

    /// Whether to include file and line number information
    pub include_file_info: bool,

    /// Whether to enable colored output (only for non-JSON format)
    pub enable_colors: bool,

    /// Log file path (optional, if None logs only to stdout)
    pub log_file: Option<String>,

    /// Module-specific log levels
    pub module_levels: std::collections::HashMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        let mut module_levels = std::collections::HashMap::new();
        module_levels.insert("repeater_engine".to_string(), "info".to_string());
        module_levels.insert("tokio".to_string(), "warn".to_string());

        Self {
            level: "info".to_string(),
            json_format: false,
            include_thread_names: false,
            include_file_info: false,
            enable_colors: true,
            log_file: None,
            module_levels,
        }
    }
}

fn build_filter(config: &LoggingConfig) -> RepeaterResult<EnvFilter> {
    if !levels::is_valid_level(&config.level) {
        return Err(RepeaterError::Logging {
            reason: format!("Invalid log level: {}", config.level),
        });
    }

    let mut filter = EnvFilter::new(&config.level);
    for (module, level) in &config.module_levels {
        let directive = format!("{}={}", module, level);
        filter = filter.add_directive(directive.parse().map_err(|e| RepeaterError::Logging {
            reason: format!("Invalid log directive '{}': {}", directive, e),
        })?);
    }
    Ok(filter)
}

/// Initialize logging based on the provided configuration
///
/// Returns the file writer guard when `log_file` is set; keep it alive for
/// as long as logs should be flushed.
pub fn init_logging(config: &LoggingConfig) -> RepeaterResult<Option<WorkerGuard>> {
    let filter = build_filter(config)?;

    let (file_layer, guard) = match &config.log_file {
        Some(path) => {
            let appender = create_file_appender(path)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false).boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let stdout_layer = if config.json_format {
        fmt::layer()
            .json()
            .with_thread_names(config.include_thread_names)
            .with_file(config.include_file_info)
            .with_line_number(config.include_file_info)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_thread_names(config.include_thread_names)
            .with_file(config.include_file_info)
            .with_line_number(config.include_file_info)
            .with_ansi(config.enable_colors)
            .boxed()
    };

    // Try to initialize logging, ignore if already initialized
    let result = tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init();

    match result {
        Ok(_) => tracing::info!("Logging initialized with config level: {}", config.level),
        Err(_) => tracing::debug!("Logging already initialized, skipping"),
    }

    Ok(guard)
}

/// Create a daily-rotated file appender
fn create_file_appender(log_file: &str) -> RepeaterResult<tracing_appender::rolling::RollingFileAppender> {
    use std::path::Path;
    use tracing_appender::rolling::{RollingFileAppender, Rotation};

    let log_path = Path::new(log_file);
    let directory = log_path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let filename = log_path
        .file_name()
        .ok_or_else(|| RepeaterError::Logging {
            reason: "Invalid log file name".to_string(),
        })?
        .to_string_lossy();

    std::fs::create_dir_all(directory).map_err(|e| RepeaterError::Logging {
        reason: format!("Failed to create log directory: {}", e),
    })?;

    Ok(RollingFileAppender::new(Rotation::DAILY, directory, filename.as_ref()))
}

/// Log level utilities
pub mod levels {
    /// Check if a log level string is valid
    pub fn is_valid_level(level: &str) -> bool {
        matches!(level.to_lowercase().as_str(), "trace" | "debug" | "info" | "warn" | "error")
    }
}
