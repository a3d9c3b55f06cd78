use greeter_core::config::load_config;
use greeter_core::greet;
use greeter_core::record::Record;
use greeter_core::telemetry::init_tracing;
use lambda_runtime::{Error, LambdaEvent, service_fn};
use tracing::info;

/// The runtime decodes the invocation payload into a JSON object and encodes
/// the returned record, so the handler only ever sees records.
pub async fn lambda_handler(event: LambdaEvent<Record>) -> Result<Record, Error> {
    let LambdaEvent { payload, context } = event;
    info!(request_id = %context.request_id, "invocation");
    Ok(greet(&payload))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = load_config(None)?;
    init_tracing(config.log_filter.as_deref());

    lambda_runtime::run(service_fn(lambda_handler)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use lambda_runtime::Context;
    use serde_json::{Value, json};

    async fn invoke(payload: Value) -> Value {
        let Value::Object(record) = payload else {
            panic!("payload must be an object");
        };
        let event = LambdaEvent::new(record, Context::default());
        Value::Object(lambda_handler(event).await.expect("handler is total"))
    }

    #[tokio::test]
    async fn test_handler_greets_name() {
        assert_eq!(
            invoke(json!({"name": "unit test"})).await,
            json!({"greeting": "Hello unit test!"})
        );
    }

    #[tokio::test]
    async fn test_handler_defaults_name() {
        assert_eq!(
            invoke(json!({"name": true})).await,
            json!({"greeting": "Hello World!"})
        );
        assert_eq!(invoke(json!({})).await, json!({"greeting": "Hello World!"}));
    }
}
