use chrono::{DateTime, Local};
use log::{Level, Metadata, Record};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: Level,
    pub target: String,
    pub message: String,
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {:<5} {}: {}",
            self.timestamp.format("%H:%M:%S%.3f"),
            self.level,
            self.target,
            self.message
        )
    }
}

/// Bounded in-memory log. Clones share the same ring, so one copy can be
/// installed as the global logger while another reads it back.
#[derive(Clone)]
pub struct AppLogger {
    ring: Arc<Mutex<VecDeque<LogEntry>>>,
    capacity: usize,
    level: Level,
}

impl AppLogger {
    /// Keep the latest `capacity` records at `Info` and above
    pub fn new(capacity: usize) -> Self {
        Self {
            ring: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
            level: Level::Info,
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Install as the `log` backend
    pub fn init(self) -> Result<(), log::SetLoggerError> {
        let max_level = self.level.to_level_filter();
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(max_level);
        Ok(())
    }

    /// Oldest first
    pub fn entries(&self) -> Vec<LogEntry> {
        let ring = self.ring.lock().unwrap_or_else(PoisonError::into_inner);
        ring.iter().cloned().collect()
    }
}

impl log::Log for AppLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) || self.capacity == 0 {
            return;
        }

        let mut ring = self.ring.lock().unwrap_or_else(PoisonError::into_inner);
        if ring.len() == self.capacity {
            ring.pop_front();
        }
        ring.push_back(LogEntry {
            timestamp: Local::now(),
            level: record.level(),
            target: record.target().to_string(),
            message: record.args().to_string(),
        });
    }

    fn flush(&self) {}
}
