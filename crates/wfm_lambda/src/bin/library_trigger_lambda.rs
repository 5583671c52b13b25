use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::{json, Value};
use wfm_lambda::adapters::aws::DynamoRecordStore;
use wfm_lambda::handlers::library_trigger::{handle_stream_event, StreamEvent, TriggerTables};

fn required_var(name: &str) -> Result<String, Error> {
    std::env::var(name).map_err(|_| Error::from(format!("{name} must be configured")))
}

async fn handle_request(event: LambdaEvent<Value>) -> Result<Value, Error> {
    let stream_event: StreamEvent = serde_json::from_value(event.payload)
        .map_err(|error| Error::from(format!("invalid stream event: {error}")))?;

    let tables = TriggerTables {
        workflows: required_var("WORKFLOWS_TABLE_NAME")?,
        schedules: required_var("WORKFLOW_SCHEDULE_TABLE")?,
        library: required_var("WORKFLOW_LIBRARY_DYNAMODB_TABLE")?,
        customers: required_var("CUSTOMERS_DYNAMODB_TABLE")?,
    };

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let store = DynamoRecordStore::new(aws_sdk_dynamodb::Client::new(&aws_config));

    let summary = handle_stream_event(&stream_event, &store, &tables)
        .map_err(|error| Error::from(error.to_string()))?;

    Ok(json!({
        "upserts": summary.upserts,
        "removals": summary.removals,
        "skipped": summary.skipped,
    }))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::run(service_fn(handle_request)).await
}
