use serde::Deserialize;
use serde_json::json;

use wfm_core::contract::{CustomerRecord, LibraryWorkflowRecord, WorkflowError};
use wfm_core::fanout::{propagation_action, PropagationAction};
use wfm_core::record::{from_item, to_item, Item};

use crate::adapters::record_store::{
    customer_key, scan_all_as, scan_all_raw, schedule_key, workflow_key, RecordStore,
};
use crate::logging::{log_error, log_info};

const COMPONENT: &str = "library_trigger";

/// Stream payload delivered when the workflow library table changes, plus
/// the replay fields used to seed a newly onboarded customer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamEvent {
    #[serde(default, rename = "Records")]
    pub records: Vec<StreamRecord>,
    #[serde(default, rename = "customerId")]
    pub customer_id: Option<String>,
    #[serde(default, rename = "deployForNewCustomer")]
    pub deploy_for_new_customer: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreamRecord {
    #[serde(rename = "eventName")]
    pub event_name: String,
    #[serde(default)]
    pub dynamodb: ChangeImages,
}

/// Typed-attribute encoded before/after images of the changed record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangeImages {
    #[serde(rename = "NewImage")]
    pub new_image: Option<Item>,
    #[serde(rename = "OldImage")]
    pub old_image: Option<Item>,
}

/// Table names the trigger works against, resolved from the environment by
/// the binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerTables {
    pub workflows: String,
    pub schedules: String,
    pub library: String,
    pub customers: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanOutSummary {
    pub upserts: usize,
    pub removals: usize,
    pub skipped: usize,
}

fn store_error(message: String) -> WorkflowError {
    WorkflowError::StoreUnavailable { message }
}

/// Propagates library-table changes to every customer's own tables.
///
/// Ordinary invocations carry stream records; an invocation flagged
/// `deployForNewCustomer` instead replays the whole library as inserts for
/// that one customer.
pub fn handle_stream_event(
    event: &StreamEvent,
    store: &dyn RecordStore,
    tables: &TriggerTables,
) -> Result<FanOutSummary, WorkflowError> {
    if event.deploy_for_new_customer {
        let customer_id = event
            .customer_id
            .as_deref()
            .ok_or_else(|| WorkflowError::Codec {
                message: "deployForNewCustomer requires customerId".to_string(),
            })?;
        return deploy_for_new_customer(customer_id, store, tables);
    }

    let customers: Vec<CustomerRecord> = scan_all_as(store, &tables.customers)?;
    let mut summary = FanOutSummary::default();

    for record in &event.records {
        match record.event_name.as_str() {
            "INSERT" | "MODIFY" => {
                let Some(image) = &record.dynamodb.new_image else {
                    log_error(
                        COMPONENT,
                        "record_missing_new_image",
                        json!({"eventName": record.event_name}),
                    );
                    continue;
                };
                let library_record: LibraryWorkflowRecord = from_item(image)?;
                apply_updated_record(&library_record, &customers, store, tables, &mut summary)?;
            }
            "REMOVE" => {
                let Some(image) = &record.dynamodb.old_image else {
                    log_error(
                        COMPONENT,
                        "record_missing_old_image",
                        json!({"eventName": record.event_name}),
                    );
                    continue;
                };
                let library_record: LibraryWorkflowRecord = from_item(image)?;
                apply_removed_record(&library_record, &customers, store, tables, &mut summary)?;
            }
            other => {
                log_info(COMPONENT, "event_ignored", json!({"eventName": other}));
            }
        }
    }

    log_info(
        COMPONENT,
        "fan_out_completed",
        json!({
            "upserts": summary.upserts,
            "removals": summary.removals,
            "skipped": summary.skipped,
        }),
    );
    Ok(summary)
}

fn deploy_for_new_customer(
    customer_id: &str,
    store: &dyn RecordStore,
    tables: &TriggerTables,
) -> Result<FanOutSummary, WorkflowError> {
    let item = store
        .get_item(&tables.customers, &customer_key(customer_id))
        .map_err(store_error)?
        .ok_or_else(|| WorkflowError::EntityNotFound {
            key: customer_id.to_string(),
        })?;
    let customer: CustomerRecord = from_item(&item)?;
    let customers = vec![customer];

    let mut summary = FanOutSummary::default();
    for raw in scan_all_raw(store, &tables.library)? {
        let library_record: LibraryWorkflowRecord = from_item(&raw)?;
        apply_updated_record(&library_record, &customers, store, tables, &mut summary)?;
    }
    log_info(
        COMPONENT,
        "new_customer_deployed",
        json!({"customerId": customer_id, "upserts": summary.upserts}),
    );
    Ok(summary)
}

/// Applies an inserted or modified library record across customers. An
/// ineligible match deletes any existing copy rather than skipping, so a
/// record whose predicates changed mid-life disappears where it no longer
/// applies.
fn apply_updated_record(
    record: &LibraryWorkflowRecord,
    customers: &[CustomerRecord],
    store: &dyn RecordStore,
    tables: &TriggerTables,
    summary: &mut FanOutSummary,
) -> Result<(), WorkflowError> {
    for customer in customers {
        match propagation_action(record, customer) {
            PropagationAction::Skip => {
                summary.skipped += 1;
            }
            PropagationAction::Remove => {
                delete_customer_copy(record, &customer.customer_id, store, tables)?;
                summary.removals += 1;
            }
            PropagationAction::Upsert => {
                let copy = record.for_customer(&customer.customer_id);
                store
                    .put_item(&tables.workflows, to_item(&copy)?)
                    .map_err(store_error)?;
                if let Some(schedule) = record.schedule_for_customer(&customer.customer_id) {
                    store
                        .put_item(&tables.schedules, to_item(&schedule)?)
                        .map_err(store_error)?;
                }
                summary.upserts += 1;
            }
        }
    }
    Ok(())
}

/// Deletes the per-customer copy for every opted-in customer,
/// unconditionally: removal from the library means removal everywhere.
fn apply_removed_record(
    record: &LibraryWorkflowRecord,
    customers: &[CustomerRecord],
    store: &dyn RecordStore,
    tables: &TriggerTables,
    summary: &mut FanOutSummary,
) -> Result<(), WorkflowError> {
    for customer in customers {
        if !customer.workflow_manager.enable_workflow_library {
            summary.skipped += 1;
            continue;
        }
        delete_customer_copy(record, &customer.customer_id, store, tables)?;
        summary.removals += 1;
    }
    Ok(())
}

fn delete_customer_copy(
    record: &LibraryWorkflowRecord,
    customer_id: &str,
    store: &dyn RecordStore,
    tables: &TriggerTables,
) -> Result<(), WorkflowError> {
    store
        .delete_item(
            &tables.workflows,
            &workflow_key(customer_id, &record.workflow_id),
        )
        .map_err(store_error)?;
    if let Some(schedule) = &record.schedule {
        store
            .delete_item(&tables.schedules, &schedule_key(customer_id, &schedule.name))
            .map_err(store_error)?;
    }
    Ok(())
}
