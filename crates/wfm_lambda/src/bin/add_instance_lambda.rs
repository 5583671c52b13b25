use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::{json, Value};
use wfm_lambda::adapters::aws::{CloudFormationStacks, S3BucketProbe};
use wfm_lambda::handlers::instance::{
    launch_instance_stack, InstanceConfig, InstanceEvent, ProvisioningOutcome,
};

fn required_var(name: &str) -> Result<String, Error> {
    std::env::var(name).map_err(|_| Error::from(format!("{name} must be configured")))
}

async fn handle_request(event: LambdaEvent<Value>) -> Result<Value, Error> {
    let instance_event: InstanceEvent = serde_json::from_value(event.payload)
        .map_err(|error| Error::from(format!("invalid instance event: {error}")))?;

    let config = InstanceConfig {
        template_url: required_var("templateUrl")?,
        resource_prefix: required_var("Prefix")?,
        lambda_role_arn: required_var("lambdaRoleArn")?,
    };

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let orchestrator = CloudFormationStacks::new(aws_sdk_cloudformation::Client::new(&aws_config));
    let probe = S3BucketProbe::new(aws_sdk_s3::Client::new(&aws_config));

    let outcome = launch_instance_stack(&orchestrator, &probe, &config, &instance_event)
        .map_err(|error| Error::from(error.to_string()))?;

    Ok(match outcome {
        ProvisioningOutcome::Created { stack_id } => {
            json!({"outcome": "created", "stackId": stack_id})
        }
        ProvisioningOutcome::Updated { stack_id } => {
            json!({"outcome": "updated", "stackId": stack_id})
        }
        ProvisioningOutcome::Unchanged { stack_id } => {
            json!({"outcome": "unchanged", "stackId": stack_id})
        }
        ProvisioningOutcome::NothingToDo => json!({"outcome": "nothing_to_do"}),
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::run(service_fn(handle_request)).await
}
