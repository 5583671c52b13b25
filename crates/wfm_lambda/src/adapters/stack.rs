/// One template parameter for a stack launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackParameter {
    pub key: String,
    pub value: String,
}

impl StackParameter {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackLaunchRequest {
    pub stack_name: String,
    pub template_url: String,
    pub parameters: Vec<StackParameter>,
}

/// Outcome of a stack update. A template that produces no changes is a
/// distinct success, not an error to string-match on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackUpdateOutcome {
    Updated { stack_id: String },
    NoChanges,
}

/// Stack-orchestration operations consumed by instance provisioning.
pub trait StackOrchestrator {
    /// Stack id when the stack exists.
    fn describe_stack(&self, stack_name: &str) -> Result<Option<String>, String>;
    fn create_stack(&self, request: &StackLaunchRequest) -> Result<String, String>;
    fn update_stack(&self, request: &StackLaunchRequest) -> Result<StackUpdateOutcome, String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketStatus {
    Exists,
    /// The bucket exists but belongs to another account. Treated as
    /// existing so provisioning never tries to create it.
    AccessDenied,
    Missing,
}

pub trait BucketProbe {
    fn bucket_status(&self, bucket_name: &str) -> Result<BucketStatus, String>;
}
