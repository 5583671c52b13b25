use std::sync::Mutex;

use wfm_core::contract::{
    CustomerRecord, ParameterSet, ScheduleDetails, ScheduleState, WorkflowDetails,
    WorkflowManagerConfig,
};
use wfm_core::naming::Platform;
use wfm_core::record::to_item;
use wfm_lambda::adapters::invoke::ExecutionDispatcher;
use wfm_lambda::adapters::memory::MemoryRecordStore;
use wfm_lambda::adapters::record_store::{schedule_key, workflow_key, RecordStore};
use wfm_lambda::handlers::library_trigger::{
    handle_stream_event, ChangeImages, StreamEvent, StreamRecord, TriggerTables,
};
use wfm_lambda::handlers::workflow::set_workflow_library_record;
use wfm_lambda::handlers::workflow_invoke::invoke_workflow;

#[derive(Default)]
struct CapturingDispatcher {
    invocations: Mutex<Vec<(String, Vec<u8>)>>,
}

impl ExecutionDispatcher for CapturingDispatcher {
    fn invoke_async(&self, function_name: &str, payload: &[u8]) -> Result<(), String> {
        self.invocations
            .lock()
            .expect("lock should pass")
            .push((function_name.to_string(), payload.to_vec()));
        Ok(())
    }
}

fn platform() -> Platform {
    Platform::new("demoteam", "dev")
}

fn tables() -> TriggerTables {
    let platform = platform();
    TriggerTables {
        workflows: platform.workflows_table(),
        schedules: platform.workflow_schedules_table(),
        library: platform.workflow_library_table(),
        customers: platform.wfm_customer_table(),
    }
}

fn store_with_tables() -> MemoryRecordStore {
    let store = MemoryRecordStore::new();
    let tables = tables();
    store.create_table(&tables.workflows, &["customerId", "workflowId"]);
    store.create_table(&tables.schedules, &["customerId", "Name"]);
    store.create_table(&tables.library, &["workflowId"]);
    store.create_table(&tables.customers, &["customerId"]);
    store
}

fn seed_customer(store: &MemoryRecordStore, customer_id: &str, endemic_type: &str) {
    let record = CustomerRecord {
        customer_id: customer_id.to_string(),
        customer_name: None,
        customer_prefix: None,
        endemic_type: Some(endemic_type.to_string()),
        instance: None,
        workflow_manager: WorkflowManagerConfig {
            enable_workflow_library: true,
        },
    };
    store
        .put_item(
            &tables().customers,
            to_item(&record).expect("customer should encode"),
        )
        .expect("put should pass");
}

fn library_details() -> WorkflowDetails {
    let mut defaults = ParameterSet::new();
    defaults.insert("timeWindowStart".to_string(), "TODAY(-8)".to_string());
    defaults.insert("timeWindowEnd".to_string(), "TODAY(-1)".to_string());
    defaults.insert("timeWindowType".to_string(), "EXPLICIT".to_string());
    defaults.insert("workflowExecutedDate".to_string(), "now()".to_string());
    WorkflowDetails {
        sql_query: "SELECT campaign, SUM(impressions) FROM traffic GROUP BY campaign".to_string(),
        default_payload: defaults,
        metadata: None,
        filtered_metrics_discriminator_column: None,
    }
}

fn stream_event(event_name: &str, image: wfm_core::record::Item) -> StreamEvent {
    let images = if event_name == "REMOVE" {
        ChangeImages {
            new_image: None,
            old_image: Some(image),
        }
    } else {
        ChangeImages {
            new_image: Some(image),
            old_image: None,
        }
    };
    StreamEvent {
        records: vec![StreamRecord {
            event_name: event_name.to_string(),
            dynamodb: images,
        }],
        customer_id: None,
        deploy_for_new_customer: false,
    }
}

#[test]
fn published_library_record_propagates_and_its_copies_are_invocable() {
    let store = store_with_tables();
    seed_customer(&store, "customer-a", "A");
    seed_customer(&store, "customer-b", "B");

    let record = set_workflow_library_record(
        &store,
        &platform(),
        "campaign-rollup",
        &library_details(),
        Some("A"),
        None,
        Some(&ScheduleDetails {
            schedule_name: "campaign-rollup-weekly".to_string(),
            state: ScheduleState::Enabled,
            schedule_expression: "custom(D * 11)".to_string(),
            metadata: None,
        }),
    )
    .expect("publish should pass");

    let summary = handle_stream_event(
        &stream_event("INSERT", to_item(&record).expect("record should encode")),
        &store,
        &tables(),
    )
    .expect("fan-out should pass");

    // Only the endemic-type A customer receives the copy.
    assert_eq!(summary.upserts, 1);
    assert_eq!(summary.removals, 1);
    assert!(store.contains(
        &tables().workflows,
        &workflow_key("customer-a", "campaign-rollup")
    ));
    assert!(store.contains(
        &tables().schedules,
        &schedule_key("customer-a", "campaign-rollup-weekly")
    ));
    assert!(!store.contains(
        &tables().workflows,
        &workflow_key("customer-b", "campaign-rollup")
    ));

    // The propagated copy resolves its own defaults when invoked.
    let dispatcher = CapturingDispatcher::default();
    let mut overrides = ParameterSet::new();
    overrides.insert("timeWindowStart".to_string(), "TODAY(-30)".to_string());
    let cargo = invoke_workflow(
        &store,
        &dispatcher,
        &platform(),
        "customer-a",
        "campaign-rollup",
        &overrides,
    )
    .expect("invoke should pass");

    assert_eq!(cargo.payload["timeWindowStart"], "TODAY(-30)");
    assert_eq!(cargo.payload["timeWindowEnd"], "TODAY(-1)");
    let invocations = dispatcher.invocations.lock().expect("lock should pass");
    assert_eq!(invocations.len(), 1);
    assert_eq!(
        invocations[0].0,
        "wfm-demoteam-ExecutionQueueProducer-dev"
    );
}

#[test]
fn retiring_a_library_record_clears_every_customer_copy() {
    let store = store_with_tables();
    seed_customer(&store, "customer-a", "A");
    seed_customer(&store, "customer-b", "A");

    let record = set_workflow_library_record(
        &store,
        &platform(),
        "campaign-rollup",
        &library_details(),
        Some("A"),
        None,
        Some(&ScheduleDetails {
            schedule_name: "campaign-rollup-weekly".to_string(),
            state: ScheduleState::Enabled,
            schedule_expression: "custom(D * 11)".to_string(),
            metadata: None,
        }),
    )
    .expect("publish should pass");
    let image = to_item(&record).expect("record should encode");

    handle_stream_event(&stream_event("INSERT", image.clone()), &store, &tables())
        .expect("fan-out should pass");
    assert_eq!(store.items(&tables().workflows).len(), 2);

    let summary = handle_stream_event(&stream_event("REMOVE", image), &store, &tables())
        .expect("fan-out should pass");

    assert_eq!(summary.removals, 2);
    assert!(store.items(&tables().workflows).is_empty());
    assert!(store.items(&tables().schedules).is_empty());
}
