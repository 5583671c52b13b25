use std::collections::BTreeSet;

use crate::contract::{ParameterSet, WorkflowError};

/// The required names the caller did not supply, for this call only.
pub fn missing_parameters(supplied: &ParameterSet, required: &[&str]) -> BTreeSet<String> {
    required
        .iter()
        .filter(|name| !supplied.contains_key(**name))
        .map(|name| name.to_string())
        .collect()
}

/// Fills every missing parameter from the stored defaults.
///
/// All-or-nothing: a single absent default fails the whole resolution, so a
/// partially filled payload can never reach the downstream dispatch. A
/// silently missing time-window parameter would otherwise run a query over
/// an unintended range.
pub fn merge_defaults(
    supplied: &ParameterSet,
    missing: &BTreeSet<String>,
    defaults: &ParameterSet,
) -> Result<ParameterSet, WorkflowError> {
    let mut resolved = supplied.clone();
    for name in missing {
        let value = defaults
            .get(name)
            .ok_or_else(|| WorkflowError::DefaultValueMissing {
                parameter: name.clone(),
            })?;
        resolved.insert(name.clone(), value.clone());
    }
    Ok(resolved)
}
