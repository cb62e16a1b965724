use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// One entry of the ordered log stream exposed to the dashboard layer.
#[derive(Debug, Clone, Serialize)]
pub struct LogEvent {
    pub level: LogLevel,
    pub message: String,
}

/// Emits job/batch progress. Every emit mirrors to `tracing`; the channel
/// is optional and only present when a consumer wants the live stream.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    tx: Option<mpsc::UnboundedSender<LogEvent>>,
}

impl EventSink {
    /// Tracing only, no stream consumer.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn channel() -> (Self, mpsc::UnboundedReceiver<LogEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    pub fn info(&self, message: impl Into<String>) {
        let message = message.into();
        info!("{}", message);
        self.emit(LogLevel::Info, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        let message = message.into();
        warn!("{}", message);
        self.emit(LogLevel::Warn, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        let message = message.into();
        error!("{}", message);
        self.emit(LogLevel::Error, message);
    }

    fn emit(&self, level: LogLevel, message: String) {
        if let Some(tx) = &self.tx {
            // A dropped receiver just means nobody is streaming anymore.
            let _ = tx.send(LogEvent { level, message });
        }
    }
}
