use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::record::{NameField, Record};

pub const GREETING_KEY: &str = "greeting";

/// Typed view of an input record. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GreetRequest {
    #[serde(default)]
    pub name: NameField,
}

impl GreetRequest {
    pub fn from_record(record: &Record) -> Self {
        Self {
            name: NameField::from_record(record),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GreetResponse {
    pub greeting: String,
}

impl GreetResponse {
    pub fn for_request(request: &GreetRequest) -> Self {
        Self {
            greeting: format!("Hello {}!", request.name.resolve()),
        }
    }
}

impl From<GreetResponse> for Record {
    fn from(response: GreetResponse) -> Self {
        let mut record = Record::new();
        record.insert(GREETING_KEY.to_string(), Value::String(response.greeting));
        record
    }
}

/// Greets the `name` found in `input`, or "World" when there is no string name.
///
/// Total: every input produces a record with exactly one `greeting` entry.
pub fn greet(input: &Record) -> Record {
    let request = GreetRequest::from_record(input);
    debug!(
        name = request.name.resolve(),
        defaulted = request.name.is_absent(),
        "greeting"
    );
    GreetResponse::for_request(&request).into()
}
