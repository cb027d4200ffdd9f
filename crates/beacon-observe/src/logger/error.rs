use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("unknown log format '{0}', expected text, json or journald")]
    InvalidFormat(String),
    #[error("journald output needs linux and the 'journald' feature")]
    JournaldNotSupported,
    #[error("global logger was already initialized")]
    AlreadyInitialized,
    #[error("logger initialization failed: {0}")]
    InitializationFailed(String),
    #[error("invalid log level filter '{0}'")]
    InvalidLogLevel(String),
}
