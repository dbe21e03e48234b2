use anyhow::{Context, Result};
use chrono::Utc;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::config::LoggingConfig;
use crate::constants::LOG_BUFFER_CAPACITY;

/// In-memory log buffer shared across the application, holding at most
/// [`LOG_BUFFER_CAPACITY`] lines
#[derive(Clone)]
pub struct Logger {
    logs: Arc<Mutex<VecDeque<String>>>,
}

impl Logger {
    pub fn new() -> Self {
        Self {
            logs: Arc::new(Mutex::new(VecDeque::with_capacity(LOG_BUFFER_CAPACITY))),
        }
    }

    /// Add a log entry
    pub fn log(&self, message: String) {
        let timestamp = Utc::now().format("%H:%M:%S%.3f").to_string();
        let formatted_message = format!("[{}] {}", timestamp, message);

        if let Ok(mut logs) = self.logs.lock() {
            if logs.len() >= LOG_BUFFER_CAPACITY {
                logs.pop_front();
            }
            logs.push_back(formatted_message);
        }
    }

    /// Get all logs, newest first
    pub fn get_logs(&self) -> Vec<String> {
        if let Ok(logs) = self.logs.lock() {
            logs.iter().rev().cloned().collect()
        } else {
            Vec::new()
        }
    }

    /// Clear all logs
    pub fn clear(&self) {
        if let Ok(mut logs) = self.logs.lock() {
            logs.clear();
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

/// Install the global `log` backend.
///
/// Records at or above the configured level go to the returned [`Logger`]
/// buffer and to the log file. With logging disabled nothing is installed
/// and the buffer stays empty.
///
/// # Errors
/// Returns an error if the log file cannot be opened or a global logger
/// was already installed
pub fn init(config: &LoggingConfig) -> Result<Logger> {
    let logger = Logger::new();
    if !config.enabled {
        return Ok(logger);
    }

    let buffer = logger.clone();
    let dispatch = fern::Dispatch::new()
        .format(|out, message, record| out.finish(format_args!("{} [{}] {}", record.level(), record.target(), message)))
        .level(config.level_filter())
        .level_for("sqlx", log::LevelFilter::Warn)
        .level_for("sea_orm", log::LevelFilter::Warn)
        .chain(fern::Output::call(move |record| buffer.log(record.args().to_string())));

    let path = config.resolve_file()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }
    let file = fern::log_file(&path).with_context(|| format!("Failed to open log file: {}", path.display()))?;
    dispatch.chain(file).apply().context("Logger already initialized")?;
    Ok(logger)
}
