use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::record::CodecError;

/// Parameter names every workflow invocation payload must carry. A fresh
/// owned set is derived from this slice on each resolution, so no call can
/// mutate the required set out from under another.
pub const REQUIRED_INVOCATION_PARAMETERS: [&str; 4] = [
    "timeWindowStart",
    "timeWindowEnd",
    "timeWindowType",
    "workflowExecutedDate",
];

/// Named string parameters forming a workflow invocation payload.
pub type ParameterSet = BTreeMap<String, String>;

/// A workflow definition stored in a customer's own workflows table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRecord {
    pub customer_id: String,
    pub workflow_id: String,
    pub sql_query: String,
    pub default_payload: ParameterSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filtered_metrics_discriminator_column: Option<String>,
}

/// Caller-supplied workflow fields, before a record is keyed to a customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowDetails {
    pub sql_query: String,
    pub default_payload: ParameterSet,
    pub metadata: Option<BTreeMap<String, String>>,
    pub filtered_metrics_discriminator_column: Option<String>,
}

/// A shared workflow in the library table, keyed by `workflowId` alone.
///
/// `endemicType` and `customerPrefix` are optional eligibility predicates:
/// when set, only customers with a matching attribute receive a copy during
/// fan-out. An embedded schedule is propagated alongside the workflow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LibraryWorkflowRecord {
    pub workflow_id: String,
    pub sql_query: String,
    pub default_payload: ParameterSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filtered_metrics_discriminator_column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endemic_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<ScheduleRecord>,
}

impl LibraryWorkflowRecord {
    /// The per-customer copy written during fan-out. The embedded schedule
    /// never travels with the workflow record itself.
    pub fn for_customer(&self, customer_id: &str) -> WorkflowRecord {
        WorkflowRecord {
            customer_id: customer_id.to_string(),
            workflow_id: self.workflow_id.clone(),
            sql_query: self.sql_query.clone(),
            default_payload: self.default_payload.clone(),
            metadata: self.metadata.clone(),
            filtered_metrics_discriminator_column: self
                .filtered_metrics_discriminator_column
                .clone(),
        }
    }

    pub fn schedule_for_customer(&self, customer_id: &str) -> Option<ScheduleRecord> {
        self.schedule.as_ref().map(|schedule| {
            let mut copy = schedule.clone();
            copy.customer_id = Some(customer_id.to_string());
            copy
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ScheduleState {
    #[serde(rename = "ENABLED")]
    Enabled,
    #[serde(rename = "DISABLED")]
    Disabled,
}

/// Payload handed to the execution trigger when a schedule fires.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduleInput {
    pub payload: ParameterSet,
}

/// A workflow schedule, keyed by `(customerId, Name)` in the schedules
/// table. The capitalized wire names are fixed by the stored data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduleRecord {
    #[serde(rename = "customerId", skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "State")]
    pub state: ScheduleState,
    #[serde(rename = "ScheduleExpression")]
    pub schedule_expression: String,
    #[serde(rename = "Input")]
    pub input: ScheduleInput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, String>>,
}

/// Caller-supplied schedule fields, before the input payload is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleDetails {
    pub schedule_name: String,
    pub state: ScheduleState,
    pub schedule_expression: String,
    pub metadata: Option<BTreeMap<String, String>>,
}

/// Workflow-manager feature flags carried on a customer record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowManagerConfig {
    #[serde(default)]
    pub enable_workflow_library: bool,
}

/// Instance-level settings written during onboarding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InstanceDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_aws_account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_endpoint: Option<String>,
    pub team_name: String,
    pub region: String,
}

/// One customer's configuration record, shared in shape between the
/// provisioning and workflow-manager customer tables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRecord {
    pub customer_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endemic_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<InstanceDetails>,
    #[serde(default)]
    pub workflow_manager: WorkflowManagerConfig,
}

/// Caller-supplied customer fields for onboarding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerDetails {
    pub customer_name: String,
    pub customer_prefix: String,
    pub endemic_type: Option<String>,
    pub region: String,
    pub data_aws_account: Option<String>,
    pub bucket_name: Option<String>,
    pub dataset_name: Option<String>,
    pub api_endpoint: Option<String>,
}

/// One row of the execution-status table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionStatusRecord {
    pub customer_id: String,
    pub workflow_id: String,
    pub create_time: String,
    pub execution_status: String,
}

/// The payload dispatched to the execution queue producer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InvocationCargo {
    pub customer_id: String,
    pub payload: ParameterSet,
}

/// Failure kinds surfaced by the handlers.
///
/// Resolution failures (`EntityNotFound`, `DefaultValueMissing`) abort the
/// operation and suppress any downstream dispatch; store and dispatch
/// failures carry the collaborator's message unaltered and are never
/// retried here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    EntityNotFound { key: String },
    DefaultValueMissing { parameter: String },
    ScheduleConfigInvalid { field: &'static str },
    StoreUnavailable { message: String },
    DispatchFailed { message: String },
    ScanLimitExceeded { table: String, pages: usize },
    Codec { message: String },
}

impl std::fmt::Display for WorkflowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EntityNotFound { key } => write!(f, "no record found for key {key}"),
            Self::DefaultValueMissing { parameter } => {
                write!(f, "no default value stored for parameter {parameter}")
            }
            Self::ScheduleConfigInvalid { field } => {
                write!(f, "schedule configuration is missing {field}")
            }
            Self::StoreUnavailable { message } => write!(f, "record store call failed: {message}"),
            Self::DispatchFailed { message } => {
                write!(f, "downstream invocation dispatch failed: {message}")
            }
            Self::ScanLimitExceeded { table, pages } => {
                write!(f, "scan of {table} did not terminate within {pages} pages")
            }
            Self::Codec { message } => f.write_str(message),
        }
    }
}

impl std::error::Error for WorkflowError {}

impl From<CodecError> for WorkflowError {
    fn from(error: CodecError) -> Self {
        Self::Codec {
            message: error.message().to_string(),
        }
    }
}
