//! Error types for ThermalBridge

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// ThermalBridge error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A single bus transaction failed
    #[error("Bus error at register {register:#04x}: {message}")]
    Bus {
        /// Register address the transaction targeted
        register: u8,
        /// Platform error description
        message: String,
    },

    /// Block read returned fewer bytes than requested
    #[error("Short read at register {register:#04x}: expected {expected} bytes, got {actual}")]
    ShortRead {
        register: u8,
        expected: usize,
        actual: usize,
    },

    /// Bus open or sensor configuration sequence failed
    #[error("Sensor initialization failed: {0}")]
    Initialization(String),

    /// Broadcast socket could not be created or configured
    #[error("Network unavailable: {0}")]
    NetworkUnavailable(#[source] std::io::Error),

    /// Datagram transmission failed
    #[error("Send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Process exit code for a fatal error.
    ///
    /// Bus bring-up failures exit with -1 and transport creation failures
    /// with -2, matching what existing deployment scripts check for.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Initialization(_) => -1,
            Error::NetworkUnavailable(_) => -2,
            _ => 1,
        }
    }

    /// Whether the error comes from a single failed bus transaction
    pub fn is_bus_error(&self) -> bool {
        matches!(self, Error::Bus { .. } | Error::ShortRead { .. })
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Error::Config(e.to_string())
    }
}
