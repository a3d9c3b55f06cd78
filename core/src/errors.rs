use thiserror::Error;

#[derive(Error, Debug)]
pub enum GreeterError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    #[error("Suite error: {0}")]
    Suite(#[from] SuiteError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Configuration validation failed: {reason}")]
    ValidationFailed { reason: String },

    #[error("Failed to load configuration from {origin}: {error}")]
    LoadFailed {
        origin: String,
        #[source]
        error: Box<dyn std::error::Error + Send + Sync>,
    },
}

#[derive(Error, Debug)]
pub enum SerializationError {
    #[error("JSON serialization failed: {reason}")]
    Json { reason: String },

    #[error("YAML serialization failed: {reason}")]
    Yaml { reason: String },

    #[error("Expected a JSON object, found {found}")]
    NotAnObject { found: String },
}

#[derive(Error, Debug)]
pub enum SuiteError {
    #[error("Suite must be a JSON array of cases")]
    NotAnArray,

    #[error("Case {index} is not a JSON object")]
    CaseNotObject { index: usize },

    #[error("Case {index} is missing field {field}")]
    MissingField { index: usize, field: String },

    #[error("Unknown test type: {kind}")]
    UnknownType { kind: String },

    #[error("Cannot open expected output payload from file '{path}': {reason}")]
    ExpectedUnreadable { path: String, reason: String },

    #[error("Cannot decode json from expected output payload from file '{path}', error '{reason}'")]
    ExpectedUndecodable { path: String, reason: String },

    /// An error recorded in the case itself.
    #[error("{message}")]
    Reported { message: String },
}

pub type Result<T> = std::result::Result<T, GreeterError>;

impl From<serde_json::Error> for GreeterError {
    fn from(err: serde_json::Error) -> Self {
        GreeterError::Serialization(SerializationError::Json {
            reason: err.to_string(),
        })
    }
}

impl From<serde_yaml::Error> for GreeterError {
    fn from(err: serde_yaml::Error) -> Self {
        GreeterError::Serialization(SerializationError::Yaml {
            reason: err.to_string(),
        })
    }
}

impl GreeterError {
    /// A record that cannot be decoded is dropped and the stream moves on.
    pub fn should_skip_record(&self) -> bool {
        matches!(self, GreeterError::Serialization(_))
    }
}
