use serde::Deserialize;
use serde_json::json;

use wfm_core::contract::WorkflowError;
use wfm_core::naming::instance_stack_name;

use crate::adapters::stack::{
    BucketProbe, BucketStatus, StackLaunchRequest, StackOrchestrator, StackParameter,
    StackUpdateOutcome,
};
use crate::logging::{log_error, log_info};

const COMPONENT: &str = "instance";

/// Provisioning request for one tenant's data instance.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstanceEvent {
    #[serde(default, rename = "TenantName")]
    pub tenant_name: Option<String>,
    #[serde(default, rename = "BucketName")]
    pub bucket_name: Option<String>,
    #[serde(default, rename = "CrossAccountAccessAccountId")]
    pub cross_account_access_account_id: Option<String>,
    #[serde(default, rename = "DatasetName")]
    pub dataset_name: Option<String>,
}

/// Deploy-time settings resolved from the environment by the binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceConfig {
    pub template_url: String,
    pub resource_prefix: String,
    pub lambda_role_arn: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisioningOutcome {
    Created { stack_id: String },
    Updated { stack_id: String },
    /// Update reported no template changes; carries the existing stack id.
    Unchanged { stack_id: String },
    /// Event was missing required fields, so no stack call was made.
    NothingToDo,
}

fn stack_error(message: String) -> WorkflowError {
    WorkflowError::StoreUnavailable { message }
}

/// Launches or updates the per-tenant instance stack. Incomplete events are
/// a quiet no-op rather than an error, matching the upstream trigger which
/// fires for records that are not yet fully provisioned.
pub fn launch_instance_stack(
    orchestrator: &dyn StackOrchestrator,
    probe: &dyn BucketProbe,
    config: &InstanceConfig,
    event: &InstanceEvent,
) -> Result<ProvisioningOutcome, WorkflowError> {
    let (Some(tenant_name), Some(bucket_name), Some(account_id), Some(dataset_name)) = (
        event.tenant_name.as_deref(),
        event.bucket_name.as_deref(),
        event.cross_account_access_account_id.as_deref(),
        event.dataset_name.as_deref(),
    ) else {
        log_info(
            COMPONENT,
            "event_incomplete",
            json!({"tenantName": event.tenant_name}),
        );
        return Ok(ProvisioningOutcome::NothingToDo);
    };

    let bucket_exists = match probe.bucket_status(bucket_name).map_err(stack_error)? {
        BucketStatus::Exists | BucketStatus::AccessDenied => true,
        BucketStatus::Missing => false,
    };

    let stack_name = instance_stack_name(&config.resource_prefix, dataset_name, tenant_name);
    let request = StackLaunchRequest {
        stack_name: stack_name.clone(),
        template_url: config.template_url.clone(),
        parameters: vec![
            StackParameter::new("pBucketName", bucket_name),
            StackParameter::new("pBucketExists", if bucket_exists { "True" } else { "False" }),
            StackParameter::new("pCrossAccountAccessAccountId", account_id),
            StackParameter::new("pTenantName", tenant_name),
            StackParameter::new("pLambdaRoleArn", config.lambda_role_arn.as_str()),
            StackParameter::new("pResourcePrefix", config.resource_prefix.as_str()),
        ],
    };

    let existing = orchestrator
        .describe_stack(&stack_name)
        .map_err(stack_error)
        .inspect_err(|error| {
            log_error(
                COMPONENT,
                "describe_failed",
                json!({"stackName": stack_name, "error": error.to_string()}),
            );
        })?;

    let outcome = match existing {
        Some(stack_id) => match orchestrator.update_stack(&request).map_err(stack_error)? {
            StackUpdateOutcome::Updated { stack_id } => ProvisioningOutcome::Updated { stack_id },
            StackUpdateOutcome::NoChanges => ProvisioningOutcome::Unchanged { stack_id },
        },
        None => {
            let stack_id = orchestrator.create_stack(&request).map_err(stack_error)?;
            ProvisioningOutcome::Created { stack_id }
        }
    };

    log_info(
        COMPONENT,
        "stack_launched",
        json!({
            "stackName": stack_name,
            "tenantName": tenant_name,
            "outcome": match &outcome {
                ProvisioningOutcome::Created { .. } => "created",
                ProvisioningOutcome::Updated { .. } => "updated",
                ProvisioningOutcome::Unchanged { .. } => "unchanged",
                ProvisioningOutcome::NothingToDo => "nothing_to_do",
            },
        }),
    );
    Ok(outcome)
}
