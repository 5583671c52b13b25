use crate::contract::{CustomerRecord, LibraryWorkflowRecord};

/// What the library-change fan-out should do for one customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropagationAction {
    /// Customer has not opted into the workflow library.
    Skip,
    /// Customer is opted in but an eligibility predicate does not match.
    /// Any existing per-customer copy must be deleted, even on an insert or
    /// modify event: the record's eligibility may have changed mid-life.
    Remove,
    /// Customer is opted in and eligible; write the per-customer copy.
    Upsert,
}

/// Decides how a changed library record applies to one customer.
///
/// An eligibility predicate only participates when the library record sets
/// it; a customer without the matching attribute compares as the empty
/// string, exactly like the stored records it mirrors.
pub fn propagation_action(
    record: &LibraryWorkflowRecord,
    customer: &CustomerRecord,
) -> PropagationAction {
    if !customer.workflow_manager.enable_workflow_library {
        return PropagationAction::Skip;
    }

    if let Some(endemic_type) = &record.endemic_type {
        let customer_endemic_type = customer.endemic_type.as_deref().unwrap_or("");
        if endemic_type != customer_endemic_type {
            return PropagationAction::Remove;
        }
    }

    if let Some(customer_prefix) = &record.customer_prefix {
        let customer_customer_prefix = customer.customer_prefix.as_deref().unwrap_or("");
        if customer_prefix != customer_customer_prefix {
            return PropagationAction::Remove;
        }
    }

    PropagationAction::Upsert
}

#[cfg(test)]
mod tests {
    use crate::contract::{ParameterSet, WorkflowManagerConfig};

    use super::*;

    fn library_record(endemic_type: Option<&str>, customer_prefix: Option<&str>) -> LibraryWorkflowRecord {
        LibraryWorkflowRecord {
            workflow_id: "shared-insights".to_string(),
            sql_query: "SELECT 1".to_string(),
            default_payload: ParameterSet::new(),
            metadata: None,
            filtered_metrics_discriminator_column: None,
            endemic_type: endemic_type.map(str::to_string),
            customer_prefix: customer_prefix.map(str::to_string),
            schedule: None,
        }
    }

    fn customer(
        opted_in: bool,
        endemic_type: Option<&str>,
        customer_prefix: Option<&str>,
    ) -> CustomerRecord {
        CustomerRecord {
            customer_id: "democustomer".to_string(),
            customer_name: None,
            customer_prefix: customer_prefix.map(str::to_string),
            endemic_type: endemic_type.map(str::to_string),
            instance: None,
            workflow_manager: WorkflowManagerConfig {
                enable_workflow_library: opted_in,
            },
        }
    }

    #[test]
    fn skips_customers_without_the_library_feature() {
        let action = propagation_action(&library_record(None, None), &customer(false, None, None));
        assert_eq!(action, PropagationAction::Skip);
    }

    #[test]
    fn upserts_when_no_predicates_are_set() {
        let action = propagation_action(&library_record(None, None), &customer(true, None, None));
        assert_eq!(action, PropagationAction::Upsert);
    }

    #[test]
    fn endemic_type_mismatch_removes_even_for_opted_in_customers() {
        let record = library_record(Some("A"), None);
        assert_eq!(
            propagation_action(&record, &customer(true, Some("A"), None)),
            PropagationAction::Upsert
        );
        assert_eq!(
            propagation_action(&record, &customer(true, Some("B"), None)),
            PropagationAction::Remove
        );
        assert_eq!(
            propagation_action(&record, &customer(true, None, None)),
            PropagationAction::Remove
        );
    }

    #[test]
    fn customer_prefix_rule_is_symmetric_with_endemic_type() {
        let record = library_record(None, Some("demo"));
        assert_eq!(
            propagation_action(&record, &customer(true, None, Some("demo"))),
            PropagationAction::Upsert
        );
        assert_eq!(
            propagation_action(&record, &customer(true, None, Some("other"))),
            PropagationAction::Remove
        );
    }

    #[test]
    fn both_predicates_must_match() {
        let record = library_record(Some("A"), Some("demo"));
        assert_eq!(
            propagation_action(&record, &customer(true, Some("A"), Some("other"))),
            PropagationAction::Remove
        );
        assert_eq!(
            propagation_action(&record, &customer(true, Some("A"), Some("demo"))),
            PropagationAction::Upsert
        );
    }
}
