use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde::Deserialize;
use serde_json::{json, Value};
use wfm_core::contract::ParameterSet;
use wfm_core::naming::Platform;
use wfm_lambda::adapters::aws::{DynamoRecordStore, LambdaDispatcher};
use wfm_lambda::handlers::workflow_invoke::invoke_workflow;

#[derive(Debug, Deserialize)]
struct InvokeRequest {
    #[serde(rename = "customerId")]
    customer_id: String,
    #[serde(rename = "workflowId")]
    workflow_id: String,
    #[serde(default)]
    payload: ParameterSet,
}

async fn handle_request(event: LambdaEvent<Value>) -> Result<Value, Error> {
    let request: InvokeRequest = serde_json::from_value(event.payload)
        .map_err(|error| Error::from(format!("invalid invoke request: {error}")))?;

    let team = std::env::var("TEAM_NAME").map_err(|_| Error::from("TEAM_NAME must be configured"))?;
    let env = std::env::var("ENV").map_err(|_| Error::from("ENV must be configured"))?;
    let platform = Platform::new(team, env);

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let store = DynamoRecordStore::new(aws_sdk_dynamodb::Client::new(&aws_config));
    let dispatcher = LambdaDispatcher::new(aws_sdk_lambda::Client::new(&aws_config));

    let cargo = invoke_workflow(
        &store,
        &dispatcher,
        &platform,
        &request.customer_id,
        &request.workflow_id,
        &request.payload,
    )
    .map_err(|error| Error::from(error.to_string()))?;

    Ok(json!({
        "customerId": cargo.customer_id,
        "workflowId": request.workflow_id,
        "dispatched": true,
    }))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::run(service_fn(handle_request)).await
}
