use serde::Deserialize;
use serde_json::json;

use crate::adapters::teardown::{LayerVersionRef, TeardownClient};
use crate::logging::{log_error, log_info};

const COMPONENT: &str = "cleanup";

/// Manifest listing every resource a retired environment leaves behind.
/// All sections are optional; an empty manifest is a no-op.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CleanupManifest {
    #[serde(default)]
    pub s3: Vec<String>,
    #[serde(default)]
    pub ddb: Vec<String>,
    #[serde(default)]
    pub sqs: Vec<String>,
    #[serde(default, rename = "lambdaLayer")]
    pub lambda_layer: Vec<ManifestLayer>,
    #[serde(default)]
    pub eventbridge: Vec<String>,
    #[serde(default)]
    pub cloudformation: Vec<String>,
    #[serde(default)]
    pub cwlogs: Vec<String>,
    #[serde(default)]
    pub kms: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManifestLayer {
    #[serde(rename = "layerName")]
    pub layer_name: String,
    pub version: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub deleted: usize,
    pub failed: usize,
}

impl CleanupReport {
    fn record(&mut self, kind: &str, name: &str, result: Result<(), String>) {
        match result {
            Ok(()) => {
                self.deleted += 1;
                log_info(COMPONENT, "resource_deleted", json!({"kind": kind, "name": name}));
            }
            Err(error) => {
                self.failed += 1;
                log_error(
                    COMPONENT,
                    "resource_delete_failed",
                    json!({"kind": kind, "name": name, "error": error}),
                );
            }
        }
    }
}

/// Deletes everything the manifest names. Order matters: buckets are
/// emptied before deletion, rules lose their targets before the rule goes,
/// and KMS keys are scheduled last so nothing earlier still needs them.
/// A failing resource is logged and counted, never aborts the sweep.
pub fn run_cleanup(client: &dyn TeardownClient, manifest: &CleanupManifest) -> CleanupReport {
    let mut report = CleanupReport::default();

    for bucket in &manifest.s3 {
        report.record("s3_empty", bucket, client.empty_bucket(bucket));
    }
    for bucket in &manifest.s3 {
        report.record("s3_bucket", bucket, client.delete_bucket(bucket));
    }
    for table in &manifest.ddb {
        report.record("ddb_table", table, client.delete_table(table));
    }
    for queue in &manifest.sqs {
        report.record("sqs_queue", queue, client.delete_queue(queue));
    }
    for layer in &manifest.lambda_layer {
        let reference = LayerVersionRef {
            layer_name: layer.layer_name.clone(),
            version: layer.version,
        };
        report.record(
            "lambda_layer",
            &layer.layer_name,
            client.delete_layer_version(&reference),
        );
    }
    for rule in &manifest.eventbridge {
        report.record("eventbridge_rule", rule, client.delete_rule(rule));
    }
    for stack in &manifest.cloudformation {
        report.record("cloudformation_stack", stack, client.delete_stack(stack));
    }
    for log_group in &manifest.cwlogs {
        report.record("log_group", log_group, client.delete_log_group(log_group));
    }
    for key in &manifest.kms {
        report.record("kms_key", key, client.schedule_key_deletion(key));
    }

    log_info(
        COMPONENT,
        "cleanup_completed",
        json!({"deleted": report.deleted, "failed": report.failed}),
    );
    report
}
