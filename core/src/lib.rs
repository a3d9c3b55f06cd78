pub mod config;
pub mod errors;
pub mod greeter;
pub mod record;
pub mod suite;
pub mod telemetry;

pub use config::{GreeterConfig, load_config};
pub use errors::{GreeterError, Result};
pub use greeter::{GreetRequest, GreetResponse, greet};
pub use record::{NameField, Record, decode_record, encode_record};
