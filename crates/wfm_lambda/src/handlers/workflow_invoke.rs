use serde_json::json;

use wfm_core::contract::{
    InvocationCargo, ParameterSet, WorkflowError, WorkflowRecord, REQUIRED_INVOCATION_PARAMETERS,
};
use wfm_core::naming::Platform;
use wfm_core::record::from_item;
use wfm_core::resolver::{merge_defaults, missing_parameters};

use crate::adapters::invoke::ExecutionDispatcher;
use crate::adapters::record_store::{workflow_key, RecordStore};
use crate::logging::{log_error, log_info};

const COMPONENT: &str = "workflow_invoke";

/// Completes a partially supplied invocation payload from the workflow's
/// stored `defaultPayload`.
///
/// A fully supplied payload returns unchanged without touching the store.
/// Otherwise the workflow record is fetched by `(customerId, workflowId)`
/// and exactly the missing names are filled; any absent default fails the
/// resolution outright.
pub fn resolve_invocation_parameters(
    store: &dyn RecordStore,
    workflows_table: &str,
    customer_id: &str,
    workflow_id: &str,
    supplied: &ParameterSet,
) -> Result<ParameterSet, WorkflowError> {
    let missing = missing_parameters(supplied, &REQUIRED_INVOCATION_PARAMETERS);
    if missing.is_empty() {
        return Ok(supplied.clone());
    }

    log_info(
        COMPONENT,
        "using_default_values",
        json!({
            "customerId": customer_id,
            "workflowId": workflow_id,
            "parameters": missing,
        }),
    );

    let item = store
        .get_item(workflows_table, &workflow_key(customer_id, workflow_id))
        .map_err(|message| WorkflowError::StoreUnavailable { message })?
        .ok_or_else(|| WorkflowError::EntityNotFound {
            key: format!("{customer_id}/{workflow_id}"),
        })?;
    let record: WorkflowRecord = from_item(&item)?;

    merge_defaults(supplied, &missing, &record.default_payload)
}

/// Resolves the payload and dispatches one asynchronous invocation to the
/// execution queue producer.
///
/// Resolution failure suppresses the dispatch entirely; a failed submission
/// is reported but never retried here, since the invoking trigger
/// redelivers the event.
pub fn invoke_workflow(
    store: &dyn RecordStore,
    dispatcher: &dyn ExecutionDispatcher,
    platform: &Platform,
    customer_id: &str,
    workflow_id: &str,
    overrides: &ParameterSet,
) -> Result<InvocationCargo, WorkflowError> {
    let resolved = resolve_invocation_parameters(
        store,
        &platform.workflows_table(),
        customer_id,
        workflow_id,
        overrides,
    )
    .inspect_err(|error| {
        log_error(
            COMPONENT,
            "resolution_failed",
            json!({
                "customerId": customer_id,
                "workflowId": workflow_id,
                "error": error.to_string(),
            }),
        );
    })?;

    let mut payload = resolved;
    payload.insert("workflowId".to_string(), workflow_id.to_string());
    let cargo = InvocationCargo {
        customer_id: customer_id.to_string(),
        payload,
    };

    let bytes = serde_json::to_vec(&cargo).map_err(|error| WorkflowError::Codec {
        message: format!("failed to encode invocation cargo: {error}"),
    })?;

    let function_name = platform.execution_queue_producer();
    dispatcher
        .invoke_async(&function_name, &bytes)
        .map_err(|message| WorkflowError::DispatchFailed { message })?;

    log_info(
        COMPONENT,
        "dispatch_submitted",
        json!({
            "customerId": customer_id,
            "workflowId": workflow_id,
            "functionName": function_name,
        }),
    );
    Ok(cargo)
}
