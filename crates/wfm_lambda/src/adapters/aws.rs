//! AWS SDK implementations of the adapter traits.
//!
//! Clients are constructed in the binaries and injected here; the traits
//! stay synchronous, so each call bridges onto the ambient Tokio runtime
//! with `block_in_place`.

use std::collections::HashMap;
use std::future::Future;

use aws_sdk_cloudformation::error::ProvideErrorMetadata;
use aws_sdk_cloudformation::types::Parameter;
use aws_sdk_lambda::types::InvocationType;

use wfm_core::record::{Item, TypedValue};

use super::invoke::ExecutionDispatcher;
use super::record_store::{RecordStore, ScanPage};
use super::stack::{
    BucketProbe, BucketStatus, StackLaunchRequest, StackOrchestrator, StackUpdateOutcome,
};
use super::teardown::{LayerVersionRef, TeardownClient};

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

fn to_sdk_value(value: &TypedValue) -> aws_sdk_dynamodb::types::AttributeValue {
    use aws_sdk_dynamodb::types::AttributeValue;
    match value {
        TypedValue::String(text) => AttributeValue::S(text.clone()),
        TypedValue::Number(text) => AttributeValue::N(text.clone()),
        TypedValue::Bool(flag) => AttributeValue::Bool(*flag),
        TypedValue::Null(flag) => AttributeValue::Null(*flag),
        TypedValue::Map(entries) => AttributeValue::M(
            entries
                .iter()
                .map(|(name, nested)| (name.clone(), to_sdk_value(nested)))
                .collect(),
        ),
        TypedValue::List(entries) => AttributeValue::L(entries.iter().map(to_sdk_value).collect()),
        TypedValue::StringSet(entries) => AttributeValue::Ss(entries.clone()),
        TypedValue::NumberSet(entries) => AttributeValue::Ns(entries.clone()),
    }
}

fn from_sdk_value(value: &aws_sdk_dynamodb::types::AttributeValue) -> Result<TypedValue, String> {
    use aws_sdk_dynamodb::types::AttributeValue;
    match value {
        AttributeValue::S(text) => Ok(TypedValue::String(text.clone())),
        AttributeValue::N(text) => Ok(TypedValue::Number(text.clone())),
        AttributeValue::Bool(flag) => Ok(TypedValue::Bool(*flag)),
        AttributeValue::Null(flag) => Ok(TypedValue::Null(*flag)),
        AttributeValue::M(entries) => {
            let mut map = std::collections::BTreeMap::new();
            for (name, nested) in entries {
                map.insert(name.clone(), from_sdk_value(nested)?);
            }
            Ok(TypedValue::Map(map))
        }
        AttributeValue::L(entries) => {
            let mut list = Vec::with_capacity(entries.len());
            for nested in entries {
                list.push(from_sdk_value(nested)?);
            }
            Ok(TypedValue::List(list))
        }
        AttributeValue::Ss(entries) => Ok(TypedValue::StringSet(entries.clone())),
        AttributeValue::Ns(entries) => Ok(TypedValue::NumberSet(entries.clone())),
        other => Err(format!("unsupported attribute value variant: {other:?}")),
    }
}

fn to_sdk_item(item: &Item) -> HashMap<String, aws_sdk_dynamodb::types::AttributeValue> {
    item.iter()
        .map(|(name, value)| (name.clone(), to_sdk_value(value)))
        .collect()
}

fn from_sdk_item(
    raw: &HashMap<String, aws_sdk_dynamodb::types::AttributeValue>,
) -> Result<Item, String> {
    let mut item = Item::new();
    for (name, value) in raw {
        item.insert(name.clone(), from_sdk_value(value)?);
    }
    Ok(item)
}

pub struct DynamoRecordStore {
    client: aws_sdk_dynamodb::Client,
}

impl DynamoRecordStore {
    pub fn new(client: aws_sdk_dynamodb::Client) -> Self {
        Self { client }
    }
}

impl RecordStore for DynamoRecordStore {
    fn get_item(&self, table: &str, key: &Item) -> Result<Option<Item>, String> {
        let client = self.client.clone();
        let table_name = table.to_string();
        let sdk_key = to_sdk_item(key);

        let response = block_on(async move {
            client
                .get_item()
                .table_name(table_name)
                .set_key(Some(sdk_key))
                .send()
                .await
                .map_err(|error| format!("failed to get item from {table}: {error}"))
        })?;

        match response.item() {
            Some(raw) => from_sdk_item(raw).map(Some),
            None => Ok(None),
        }
    }

    fn put_item(&self, table: &str, item: Item) -> Result<(), String> {
        let client = self.client.clone();
        let table_name = table.to_string();
        let sdk_item = to_sdk_item(&item);

        block_on(async move {
            client
                .put_item()
                .table_name(table_name)
                .set_item(Some(sdk_item))
                .send()
                .await
                .map(|_| ())
                .map_err(|error| format!("failed to put item into {table}: {error}"))
        })
    }

    fn delete_item(&self, table: &str, key: &Item) -> Result<(), String> {
        let client = self.client.clone();
        let table_name = table.to_string();
        let sdk_key = to_sdk_item(key);

        block_on(async move {
            client
                .delete_item()
                .table_name(table_name)
                .set_key(Some(sdk_key))
                .send()
                .await
                .map(|_| ())
                .map_err(|error| format!("failed to delete item from {table}: {error}"))
        })
    }

    fn scan_page(&self, table: &str, start_key: Option<&Item>) -> Result<ScanPage, String> {
        let client = self.client.clone();
        let table_name = table.to_string();
        let sdk_start_key = start_key.map(to_sdk_item);

        let response = block_on(async move {
            client
                .scan()
                .table_name(table_name)
                .set_exclusive_start_key(sdk_start_key)
                .send()
                .await
                .map_err(|error| format!("failed to scan {table}: {error}"))
        })?;

        let mut items = Vec::with_capacity(response.items().len());
        for raw in response.items() {
            items.push(from_sdk_item(raw)?);
        }
        let last_evaluated_key = match response.last_evaluated_key() {
            Some(raw) => Some(from_sdk_item(raw)?),
            None => None,
        };
        Ok(ScanPage {
            items,
            last_evaluated_key,
        })
    }
}

pub struct LambdaDispatcher {
    client: aws_sdk_lambda::Client,
}

impl LambdaDispatcher {
    pub fn new(client: aws_sdk_lambda::Client) -> Self {
        Self { client }
    }
}

impl ExecutionDispatcher for LambdaDispatcher {
    fn invoke_async(&self, function_name: &str, payload: &[u8]) -> Result<(), String> {
        let client = self.client.clone();
        let function = function_name.to_string();
        let request_payload = payload.to_vec();

        block_on(async move {
            client
                .invoke()
                .function_name(&function)
                .invocation_type(InvocationType::Event)
                .set_payload(Some(request_payload.into()))
                .send()
                .await
                .map(|_| ())
                .map_err(|error| format!("failed to invoke {function}: {error}"))
        })
    }
}

pub struct CloudFormationStacks {
    client: aws_sdk_cloudformation::Client,
}

impl CloudFormationStacks {
    pub fn new(client: aws_sdk_cloudformation::Client) -> Self {
        Self { client }
    }
}

fn stack_parameters(request: &StackLaunchRequest) -> Vec<Parameter> {
    request
        .parameters
        .iter()
        .map(|parameter| {
            Parameter::builder()
                .parameter_key(&parameter.key)
                .parameter_value(&parameter.value)
                .build()
        })
        .collect()
}

impl StackOrchestrator for CloudFormationStacks {
    fn describe_stack(&self, stack_name: &str) -> Result<Option<String>, String> {
        let client = self.client.clone();
        let name = stack_name.to_string();

        block_on(async move {
            match client.describe_stacks().stack_name(&name).send().await {
                Ok(output) => Ok(output
                    .stacks()
                    .first()
                    .and_then(|stack| stack.stack_id())
                    .map(str::to_string)),
                Err(error) => {
                    let missing = error.as_service_error().is_some_and(|service_error| {
                        service_error.code() == Some("ValidationError")
                            && service_error
                                .message()
                                .is_some_and(|message| message.contains("does not exist"))
                    });
                    if missing {
                        Ok(None)
                    } else {
                        Err(format!("failed to describe stack {name}: {error}"))
                    }
                }
            }
        })
    }

    fn create_stack(&self, request: &StackLaunchRequest) -> Result<String, String> {
        let client = self.client.clone();
        let name = request.stack_name.clone();
        let template_url = request.template_url.clone();
        let parameters = stack_parameters(request);

        block_on(async move {
            let output = client
                .create_stack()
                .stack_name(&name)
                .template_url(template_url)
                .set_parameters(Some(parameters))
                .send()
                .await
                .map_err(|error| format!("failed to create stack {name}: {error}"))?;
            output
                .stack_id()
                .map(str::to_string)
                .ok_or_else(|| format!("stack {name} was created without a stack id"))
        })
    }

    fn update_stack(&self, request: &StackLaunchRequest) -> Result<StackUpdateOutcome, String> {
        let client = self.client.clone();
        let name = request.stack_name.clone();
        let template_url = request.template_url.clone();
        let parameters = stack_parameters(request);

        block_on(async move {
            match client
                .update_stack()
                .stack_name(&name)
                .template_url(template_url)
                .set_parameters(Some(parameters))
                .send()
                .await
            {
                Ok(output) => {
                    let stack_id = output
                        .stack_id()
                        .map(str::to_string)
                        .ok_or_else(|| format!("stack {name} was updated without a stack id"))?;
                    Ok(StackUpdateOutcome::Updated { stack_id })
                }
                Err(error) => {
                    // The service reports an unchanged template as a
                    // ValidationError rather than a distinct error shape.
                    let no_changes = error.as_service_error().is_some_and(|service_error| {
                        service_error.code() == Some("ValidationError")
                            && service_error.message().is_some_and(|message| {
                                message.starts_with("No updates are to be performed")
                            })
                    });
                    if no_changes {
                        Ok(StackUpdateOutcome::NoChanges)
                    } else {
                        Err(format!("failed to update stack {name}: {error}"))
                    }
                }
            }
        })
    }
}

pub struct S3BucketProbe {
    client: aws_sdk_s3::Client,
}

impl S3BucketProbe {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }
}

impl BucketProbe for S3BucketProbe {
    fn bucket_status(&self, bucket_name: &str) -> Result<BucketStatus, String> {
        let client = self.client.clone();
        let bucket = bucket_name.to_string();

        block_on(async move {
            match client.head_bucket().bucket(&bucket).send().await {
                Ok(_) => Ok(BucketStatus::Exists),
                Err(error) => {
                    if error
                        .as_service_error()
                        .is_some_and(|service_error| service_error.is_not_found())
                    {
                        return Ok(BucketStatus::Missing);
                    }
                    if error
                        .raw_response()
                        .is_some_and(|response| response.status().as_u16() == 403)
                    {
                        return Ok(BucketStatus::AccessDenied);
                    }
                    Err(format!("failed to probe bucket {bucket}: {error}"))
                }
            }
        })
    }
}

/// Teardown operations spanning the platform's managed services, backed by
/// one client per service from a single shared config.
pub struct AwsTeardownClient {
    s3: aws_sdk_s3::Client,
    dynamodb: aws_sdk_dynamodb::Client,
    sqs: aws_sdk_sqs::Client,
    lambda: aws_sdk_lambda::Client,
    events: aws_sdk_eventbridge::Client,
    cloudformation: aws_sdk_cloudformation::Client,
    logs: aws_sdk_cloudwatchlogs::Client,
    kms: aws_sdk_kms::Client,
}

impl AwsTeardownClient {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            s3: aws_sdk_s3::Client::new(config),
            dynamodb: aws_sdk_dynamodb::Client::new(config),
            sqs: aws_sdk_sqs::Client::new(config),
            lambda: aws_sdk_lambda::Client::new(config),
            events: aws_sdk_eventbridge::Client::new(config),
            cloudformation: aws_sdk_cloudformation::Client::new(config),
            logs: aws_sdk_cloudwatchlogs::Client::new(config),
            kms: aws_sdk_kms::Client::new(config),
        }
    }
}

impl TeardownClient for AwsTeardownClient {
    fn empty_bucket(&self, bucket_name: &str) -> Result<(), String> {
        let client = self.s3.clone();
        let bucket = bucket_name.to_string();

        block_on(async move {
            let mut continuation_token: Option<String> = None;
            loop {
                let listing = client
                    .list_objects_v2()
                    .bucket(&bucket)
                    .set_continuation_token(continuation_token.take())
                    .send()
                    .await
                    .map_err(|error| format!("failed to list objects in {bucket}: {error}"))?;
                for object in listing.contents() {
                    if let Some(key) = object.key() {
                        client
                            .delete_object()
                            .bucket(&bucket)
                            .key(key)
                            .send()
                            .await
                            .map_err(|error| {
                                format!("failed to delete {key} from {bucket}: {error}")
                            })?;
                    }
                }
                if listing.is_truncated() == Some(true) {
                    continuation_token = listing.next_continuation_token().map(str::to_string);
                } else {
                    break;
                }
            }

            let mut key_marker: Option<String> = None;
            let mut version_marker: Option<String> = None;
            loop {
                let listing = client
                    .list_object_versions()
                    .bucket(&bucket)
                    .set_key_marker(key_marker.take())
                    .set_version_id_marker(version_marker.take())
                    .send()
                    .await
                    .map_err(|error| format!("failed to list versions in {bucket}: {error}"))?;
                for version in listing.versions() {
                    if let (Some(key), Some(version_id)) = (version.key(), version.version_id()) {
                        client
                            .delete_object()
                            .bucket(&bucket)
                            .key(key)
                            .version_id(version_id)
                            .send()
                            .await
                            .map_err(|error| {
                                format!("failed to delete version of {key} in {bucket}: {error}")
                            })?;
                    }
                }
                for marker in listing.delete_markers() {
                    if let (Some(key), Some(version_id)) = (marker.key(), marker.version_id()) {
                        client
                            .delete_object()
                            .bucket(&bucket)
                            .key(key)
                            .version_id(version_id)
                            .send()
                            .await
                            .map_err(|error| {
                                format!("failed to delete marker of {key} in {bucket}: {error}")
                            })?;
                    }
                }
                if listing.is_truncated() == Some(true) {
                    key_marker = listing.next_key_marker().map(str::to_string);
                    version_marker = listing.next_version_id_marker().map(str::to_string);
                } else {
                    break;
                }
            }
            Ok(())
        })
    }

    fn delete_bucket(&self, bucket_name: &str) -> Result<(), String> {
        let client = self.s3.clone();
        let bucket = bucket_name.to_string();
        block_on(async move {
            client
                .delete_bucket()
                .bucket(&bucket)
                .send()
                .await
                .map(|_| ())
                .map_err(|error| format!("failed to delete bucket {bucket}: {error}"))
        })
    }

    fn delete_table(&self, table_name: &str) -> Result<(), String> {
        let client = self.dynamodb.clone();
        let table = table_name.to_string();
        block_on(async move {
            client
                .delete_table()
                .table_name(&table)
                .send()
                .await
                .map(|_| ())
                .map_err(|error| format!("failed to delete table {table}: {error}"))
        })
    }

    fn delete_queue(&self, queue_url: &str) -> Result<(), String> {
        let client = self.sqs.clone();
        let url = queue_url.to_string();
        block_on(async move {
            client
                .delete_queue()
                .queue_url(&url)
                .send()
                .await
                .map(|_| ())
                .map_err(|error| format!("failed to delete queue {url}: {error}"))
        })
    }

    fn delete_layer_version(&self, layer: &LayerVersionRef) -> Result<(), String> {
        let client = self.lambda.clone();
        let layer_name = layer.layer_name.clone();
        let version = layer.version;
        block_on(async move {
            client
                .delete_layer_version()
                .layer_name(&layer_name)
                .version_number(version)
                .send()
                .await
                .map(|_| ())
                .map_err(|error| {
                    format!("failed to delete layer {layer_name} version {version}: {error}")
                })
        })
    }

    fn delete_rule(&self, rule_name: &str) -> Result<(), String> {
        let client = self.events.clone();
        let rule = rule_name.to_string();
        block_on(async move {
            let targets = client
                .list_targets_by_rule()
                .rule(&rule)
                .send()
                .await
                .map_err(|error| format!("failed to list targets for rule {rule}: {error}"))?;
            let target_ids: Vec<String> = targets
                .targets()
                .iter()
                .map(|target| target.id().to_string())
                .collect();
            if !target_ids.is_empty() {
                client
                    .remove_targets()
                    .rule(&rule)
                    .set_ids(Some(target_ids))
                    .send()
                    .await
                    .map_err(|error| {
                        format!("failed to remove targets from rule {rule}: {error}")
                    })?;
            }
            client
                .delete_rule()
                .name(&rule)
                .send()
                .await
                .map(|_| ())
                .map_err(|error| format!("failed to delete rule {rule}: {error}"))
        })
    }

    fn delete_stack(&self, stack_name: &str) -> Result<(), String> {
        let client = self.cloudformation.clone();
        let stack = stack_name.to_string();
        block_on(async move {
            client
                .delete_stack()
                .stack_name(&stack)
                .send()
                .await
                .map(|_| ())
                .map_err(|error| format!("failed to delete stack {stack}: {error}"))
        })
    }

    fn delete_log_group(&self, log_group: &str) -> Result<(), String> {
        let client = self.logs.clone();
        let group = log_group.to_string();
        block_on(async move {
            client
                .delete_log_group()
                .log_group_name(&group)
                .send()
                .await
                .map(|_| ())
                .map_err(|error| format!("failed to delete log group {group}: {error}"))
        })
    }

    fn schedule_key_deletion(&self, key_id: &str) -> Result<(), String> {
        let client = self.kms.clone();
        let key = key_id.to_string();
        block_on(async move {
            client
                .schedule_key_deletion()
                .key_id(&key)
                .pending_window_in_days(7)
                .send()
                .await
                .map(|_| ())
                .map_err(|error| format!("failed to schedule deletion of key {key}: {error}"))
        })
    }
}
