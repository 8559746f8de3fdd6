use thiserror::Error;

/// Failures while assembling the runtime: configuration, logging and the
/// default transport.
#[derive(Error, Debug)]
pub enum Error {
    /// A configuration value failed validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// An environment variable held an unparsable value
    #[error("Invalid value for {key}: {value:?}")]
    InvalidEnv { key: String, value: String },

    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    #[error("Logging setup failed: {0}")]
    Logging(String),

    /// The default HTTP transport could not be constructed
    #[error("HTTP transport unavailable: {0}")]
    Transport(String),
}

pub type Result<T> = std::result::Result<T, Error>;
