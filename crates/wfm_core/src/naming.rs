/// Team- and environment-qualified resource names.
///
/// Workflow-manager tables live under a `wfm-` prefix; the customer
/// provisioning table under `tps-`. The qualifiers come from deployment
/// configuration and are threaded through the binaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub team: String,
    pub env: String,
}

impl Platform {
    pub fn new(team: impl Into<String>, env: impl Into<String>) -> Self {
        Self {
            team: team.into(),
            env: env.into(),
        }
    }

    pub fn workflows_table(&self) -> String {
        format!("wfm-{}-Workflows-{}", self.team, self.env)
    }

    pub fn workflow_schedules_table(&self) -> String {
        format!("wfm-{}-WorkflowSchedules-{}", self.team, self.env)
    }

    pub fn workflow_library_table(&self) -> String {
        format!("wfm-{}-WorkflowLibrary-{}", self.team, self.env)
    }

    pub fn execution_status_table(&self) -> String {
        format!("wfm-{}-ExecutionStatus-{}", self.team, self.env)
    }

    pub fn wfm_customer_table(&self) -> String {
        format!("wfm-{}-CustomerConfig-{}", self.team, self.env)
    }

    pub fn tps_customer_table(&self) -> String {
        format!("tps-{}-CustomerConfig-{}", self.team, self.env)
    }

    /// The downstream function receiving fire-and-forget invocations.
    pub fn execution_queue_producer(&self) -> String {
        format!("wfm-{}-ExecutionQueueProducer-{}", self.team, self.env)
    }
}

/// Stack name for a tenant's provisioned instance.
pub fn instance_stack_name(resource_prefix: &str, dataset_name: &str, tenant_name: &str) -> String {
    format!("{resource_prefix}-{dataset_name}-instance-{tenant_name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composes_qualified_table_names() {
        let platform = Platform::new("demoteam", "dev");
        assert_eq!(platform.workflows_table(), "wfm-demoteam-Workflows-dev");
        assert_eq!(
            platform.workflow_schedules_table(),
            "wfm-demoteam-WorkflowSchedules-dev"
        );
        assert_eq!(
            platform.workflow_library_table(),
            "wfm-demoteam-WorkflowLibrary-dev"
        );
        assert_eq!(
            platform.execution_status_table(),
            "wfm-demoteam-ExecutionStatus-dev"
        );
        assert_eq!(
            platform.wfm_customer_table(),
            "wfm-demoteam-CustomerConfig-dev"
        );
        assert_eq!(
            platform.tps_customer_table(),
            "tps-demoteam-CustomerConfig-dev"
        );
    }

    #[test]
    fn composes_the_queue_producer_function_name() {
        let platform = Platform::new("demoteam", "prod");
        assert_eq!(
            platform.execution_queue_producer(),
            "wfm-demoteam-ExecutionQueueProducer-prod"
        );
    }

    #[test]
    fn composes_instance_stack_names() {
        assert_eq!(
            instance_stack_name("adsplatform", "insights", "tenant-a"),
            "adsplatform-insights-instance-tenant-a"
        );
    }
}
