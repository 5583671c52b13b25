use serde_json::json;

use wfm_core::contract::{
    CustomerDetails, CustomerRecord, InstanceDetails, WorkflowError, WorkflowManagerConfig,
};
use wfm_core::naming::Platform;
use wfm_core::record::{from_item, to_item};

use crate::adapters::record_store::{customer_key, scan_all_as, RecordStore};
use crate::logging::log_info;

const COMPONENT: &str = "customer_management";

fn store_error(message: String) -> WorkflowError {
    WorkflowError::StoreUnavailable { message }
}

/// Onboards a customer into the provisioning table. Running it again for an
/// existing customer overwrites the whole configuration record.
pub fn onboard_customer(
    store: &dyn RecordStore,
    platform: &Platform,
    customer_id: &str,
    details: &CustomerDetails,
) -> Result<CustomerRecord, WorkflowError> {
    let record = CustomerRecord {
        customer_id: customer_id.to_string(),
        customer_name: Some(details.customer_name.clone()),
        customer_prefix: Some(details.customer_prefix.clone()),
        endemic_type: details.endemic_type.clone(),
        instance: Some(InstanceDetails {
            data_aws_account: details.data_aws_account.clone(),
            bucket_name: details.bucket_name.clone(),
            dataset_name: details.dataset_name.clone(),
            api_endpoint: details.api_endpoint.clone(),
            team_name: platform.team.clone(),
            region: details.region.clone(),
        }),
        workflow_manager: WorkflowManagerConfig::default(),
    };

    store
        .put_item(&platform.tps_customer_table(), to_item(&record)?)
        .map_err(store_error)?;
    log_info(
        COMPONENT,
        "customer_onboarded",
        json!({"customerId": customer_id}),
    );
    Ok(record)
}

pub fn get_customers(
    store: &dyn RecordStore,
    platform: &Platform,
) -> Result<Vec<CustomerRecord>, WorkflowError> {
    scan_all_as(store, &platform.wfm_customer_table())
}

/// Replaces the workflow-manager flags on a customer's configuration.
///
/// Read the full record, merge in memory, write the full record back. Not
/// transactional: concurrent writers to the same customer race and the last
/// full-record write wins. Accepted for the low write concurrency here.
pub fn set_customer_config(
    store: &dyn RecordStore,
    platform: &Platform,
    customer_id: &str,
    config: &WorkflowManagerConfig,
) -> Result<CustomerRecord, WorkflowError> {
    let table = platform.wfm_customer_table();
    let item = store
        .get_item(&table, &customer_key(customer_id))
        .map_err(store_error)?
        .ok_or_else(|| WorkflowError::EntityNotFound {
            key: customer_id.to_string(),
        })?;

    let mut record: CustomerRecord = from_item(&item)?;
    record.workflow_manager = config.clone();

    store
        .put_item(&table, to_item(&record)?)
        .map_err(store_error)?;
    Ok(record)
}

/// Removes a customer from both customer tables. The deletes are
/// independent; each table is cleaned even if the other never held a row.
pub fn delete_customer(
    store: &dyn RecordStore,
    platform: &Platform,
    customer_id: &str,
) -> Result<(), WorkflowError> {
    let key = customer_key(customer_id);
    store
        .delete_item(&platform.wfm_customer_table(), &key)
        .map_err(store_error)?;
    store
        .delete_item(&platform.tps_customer_table(), &key)
        .map_err(store_error)?;
    log_info(
        COMPONENT,
        "customer_deleted",
        json!({"customerId": customer_id}),
    );
    Ok(())
}
