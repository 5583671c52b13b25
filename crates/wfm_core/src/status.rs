use chrono::DateTime;

use crate::contract::ExecutionStatusRecord;

/// The most recent execution-status rows, newest first.
///
/// Rows whose `createTime` does not parse sort after every dated row, so a
/// malformed timestamp can never shadow real activity.
pub fn latest_executions(
    mut records: Vec<ExecutionStatusRecord>,
    rows: usize,
) -> Vec<ExecutionStatusRecord> {
    records.sort_by_key(|record| {
        std::cmp::Reverse(
            DateTime::parse_from_rfc3339(&record.create_time)
                .map(|time| time.timestamp_millis())
                .unwrap_or(i64::MIN),
        )
    });
    records.truncate(rows);
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(workflow_id: &str, create_time: &str) -> ExecutionStatusRecord {
        ExecutionStatusRecord {
            customer_id: "democustomer".to_string(),
            workflow_id: workflow_id.to_string(),
            create_time: create_time.to_string(),
            execution_status: "SUCCEEDED".to_string(),
        }
    }

    #[test]
    fn returns_newest_rows_first() {
        let records = vec![
            record("wf-old", "2022-01-05T08:00:00Z"),
            record("wf-new", "2022-03-01T10:30:00Z"),
            record("wf-mid", "2022-02-10T23:59:59Z"),
        ];

        let latest = latest_executions(records, 2);
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].workflow_id, "wf-new");
        assert_eq!(latest[1].workflow_id, "wf-mid");
    }

    #[test]
    fn unparseable_timestamps_sort_last() {
        let records = vec![
            record("wf-bad", "yesterday"),
            record("wf-dated", "2022-01-05T08:00:00Z"),
        ];

        let latest = latest_executions(records, 5);
        assert_eq!(latest[0].workflow_id, "wf-dated");
        assert_eq!(latest[1].workflow_id, "wf-bad");
    }

    #[test]
    fn truncates_to_the_requested_row_count() {
        let records = (0..10)
            .map(|idx| record(&format!("wf-{idx}"), &format!("2022-01-{:02}T00:00:00Z", idx + 1)))
            .collect();
        assert_eq!(latest_executions(records, 5).len(), 5);
    }
}
