use serde_json::{json, Map, Value};

use wfm_core::contract::{
    ExecutionStatusRecord, LibraryWorkflowRecord, ParameterSet, ScheduleDetails, ScheduleInput,
    ScheduleRecord, WorkflowDetails, WorkflowError, WorkflowRecord,
};
use wfm_core::naming::Platform;
use wfm_core::record::to_item;
use wfm_core::status::latest_executions;

use crate::adapters::record_store::{
    library_key, scan_all, scan_all_as, schedule_key, workflow_key, RecordStore,
};
use crate::handlers::workflow_invoke::resolve_invocation_parameters;
use crate::logging::log_info;

const COMPONENT: &str = "workflow_management";

fn store_error(message: String) -> WorkflowError {
    WorkflowError::StoreUnavailable { message }
}

/// Creates or wholesale-overwrites a workflow record.
pub fn set_workflow_record(
    store: &dyn RecordStore,
    platform: &Platform,
    customer_id: &str,
    workflow_id: &str,
    details: &WorkflowDetails,
) -> Result<WorkflowRecord, WorkflowError> {
    let record = WorkflowRecord {
        customer_id: customer_id.to_string(),
        workflow_id: workflow_id.to_string(),
        sql_query: details.sql_query.clone(),
        default_payload: details.default_payload.clone(),
        metadata: details.metadata.clone(),
        filtered_metrics_discriminator_column: details
            .filtered_metrics_discriminator_column
            .clone(),
    };
    store
        .put_item(&platform.workflows_table(), to_item(&record)?)
        .map_err(store_error)?;
    Ok(record)
}

pub fn delete_workflow_record(
    store: &dyn RecordStore,
    platform: &Platform,
    customer_id: &str,
    workflow_id: &str,
) -> Result<(), WorkflowError> {
    store
        .delete_item(
            &platform.workflows_table(),
            &workflow_key(customer_id, workflow_id),
        )
        .map_err(store_error)
}

pub fn get_workflow_records(
    store: &dyn RecordStore,
    platform: &Platform,
) -> Result<Vec<Map<String, Value>>, WorkflowError> {
    scan_all(store, &platform.workflows_table())
}

/// Creates or overwrites a schedule for a stored workflow.
///
/// The schedule's input payload starts from the caller's overrides; any
/// missing required parameter is resolved from the workflow's
/// `defaultPayload`. A failed resolution writes nothing.
pub fn set_workflow_schedule(
    store: &dyn RecordStore,
    platform: &Platform,
    customer_id: &str,
    workflow_id: &str,
    details: &ScheduleDetails,
    overrides: &ParameterSet,
) -> Result<ScheduleRecord, WorkflowError> {
    if details.schedule_name.trim().is_empty() {
        return Err(WorkflowError::ScheduleConfigInvalid {
            field: "scheduleName",
        });
    }

    let mut payload = resolve_invocation_parameters(
        store,
        &platform.workflows_table(),
        customer_id,
        workflow_id,
        overrides,
    )?;
    payload.insert("workflowId".to_string(), workflow_id.to_string());

    let record = ScheduleRecord {
        customer_id: Some(customer_id.to_string()),
        name: details.schedule_name.clone(),
        state: details.state,
        schedule_expression: details.schedule_expression.clone(),
        input: ScheduleInput { payload },
        metadata: details.metadata.clone(),
    };
    store
        .put_item(&platform.workflow_schedules_table(), to_item(&record)?)
        .map_err(store_error)?;

    log_info(
        COMPONENT,
        "schedule_written",
        json!({
            "customerId": customer_id,
            "workflowId": workflow_id,
            "scheduleName": record.name,
        }),
    );
    Ok(record)
}

pub fn delete_workflow_schedule(
    store: &dyn RecordStore,
    platform: &Platform,
    customer_id: &str,
    schedule_name: &str,
) -> Result<(), WorkflowError> {
    store
        .delete_item(
            &platform.workflow_schedules_table(),
            &schedule_key(customer_id, schedule_name),
        )
        .map_err(store_error)
}

pub fn get_workflow_schedules(
    store: &dyn RecordStore,
    platform: &Platform,
) -> Result<Vec<Map<String, Value>>, WorkflowError> {
    scan_all(store, &platform.workflow_schedules_table())
}

/// Creates or overwrites a shared library workflow.
///
/// An embedded schedule's input payload is seeded with the workflow id and
/// the workflow's whole `defaultPayload`; the fan-out resolves nothing at
/// propagation time. A schedule without a name fails before anything is
/// written.
pub fn set_workflow_library_record(
    store: &dyn RecordStore,
    platform: &Platform,
    workflow_id: &str,
    details: &WorkflowDetails,
    endemic_type: Option<&str>,
    customer_prefix: Option<&str>,
    schedule: Option<&ScheduleDetails>,
) -> Result<LibraryWorkflowRecord, WorkflowError> {
    let embedded_schedule = match schedule {
        Some(schedule_details) => {
            if schedule_details.schedule_name.trim().is_empty() {
                return Err(WorkflowError::ScheduleConfigInvalid {
                    field: "scheduleName",
                });
            }
            let mut payload = details.default_payload.clone();
            payload.insert("workflowId".to_string(), workflow_id.to_string());
            Some(ScheduleRecord {
                customer_id: None,
                name: schedule_details.schedule_name.clone(),
                state: schedule_details.state,
                schedule_expression: schedule_details.schedule_expression.clone(),
                input: ScheduleInput { payload },
                metadata: schedule_details.metadata.clone(),
            })
        }
        None => None,
    };

    let record = LibraryWorkflowRecord {
        workflow_id: workflow_id.to_string(),
        sql_query: details.sql_query.clone(),
        default_payload: details.default_payload.clone(),
        metadata: details.metadata.clone(),
        filtered_metrics_discriminator_column: details
            .filtered_metrics_discriminator_column
            .clone(),
        endemic_type: endemic_type.map(str::to_string),
        customer_prefix: customer_prefix.map(str::to_string),
        schedule: embedded_schedule,
    };
    store
        .put_item(&platform.workflow_library_table(), to_item(&record)?)
        .map_err(store_error)?;
    Ok(record)
}

pub fn delete_workflow_library_record(
    store: &dyn RecordStore,
    platform: &Platform,
    workflow_id: &str,
) -> Result<(), WorkflowError> {
    store
        .delete_item(&platform.workflow_library_table(), &library_key(workflow_id))
        .map_err(store_error)
}

pub fn get_workflow_library_records(
    store: &dyn RecordStore,
    platform: &Platform,
) -> Result<Vec<Map<String, Value>>, WorkflowError> {
    scan_all(store, &platform.workflow_library_table())
}

/// The most recent execution-status rows, newest first.
pub fn get_execution_status(
    store: &dyn RecordStore,
    platform: &Platform,
    rows: usize,
) -> Result<Vec<ExecutionStatusRecord>, WorkflowError> {
    let records = scan_all_as(store, &platform.execution_status_table())?;
    Ok(latest_executions(records, rows))
}
