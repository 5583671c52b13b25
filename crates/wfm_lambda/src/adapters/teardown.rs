/// A Lambda layer version pinned for deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerVersionRef {
    pub layer_name: String,
    pub version: i64,
}

/// Deletion operations used by the environment-teardown flow. One trait,
/// one session, mirroring the single set of service clients the teardown
/// runs with.
pub trait TeardownClient {
    fn empty_bucket(&self, bucket_name: &str) -> Result<(), String>;
    fn delete_bucket(&self, bucket_name: &str) -> Result<(), String>;
    fn delete_table(&self, table_name: &str) -> Result<(), String>;
    fn delete_queue(&self, queue_url: &str) -> Result<(), String>;
    fn delete_layer_version(&self, layer: &LayerVersionRef) -> Result<(), String>;
    /// Removes the rule's targets first; a rule with targets cannot be
    /// deleted.
    fn delete_rule(&self, rule_name: &str) -> Result<(), String>;
    fn delete_stack(&self, stack_name: &str) -> Result<(), String>;
    fn delete_log_group(&self, log_group: &str) -> Result<(), String>;
    /// Schedules the key for deletion after the shortest allowed window.
    fn schedule_key_deletion(&self, key_id: &str) -> Result<(), String>;
}
