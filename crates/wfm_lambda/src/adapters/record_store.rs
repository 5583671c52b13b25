use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use wfm_core::contract::WorkflowError;
use wfm_core::record::{deserialize_item, from_item, Item, TypedValue};

/// One page of a table scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanPage {
    pub items: Vec<Item>,
    pub last_evaluated_key: Option<Item>,
}

/// Key-value store operations consumed by the handlers. Implementations
/// surface transport errors unaltered; no retry happens at this layer.
pub trait RecordStore {
    fn get_item(&self, table: &str, key: &Item) -> Result<Option<Item>, String>;
    fn put_item(&self, table: &str, item: Item) -> Result<(), String>;
    fn delete_item(&self, table: &str, key: &Item) -> Result<(), String>;
    fn scan_page(&self, table: &str, start_key: Option<&Item>) -> Result<ScanPage, String>;
}

/// Upper bound on scan pages. A store that keeps returning continuation
/// keys past this is misbehaving and the scan fails instead of spinning.
pub const MAX_SCAN_PAGES: usize = 1_000;

pub fn workflow_key(customer_id: &str, workflow_id: &str) -> Item {
    Item::from([
        (
            "customerId".to_string(),
            TypedValue::String(customer_id.to_string()),
        ),
        (
            "workflowId".to_string(),
            TypedValue::String(workflow_id.to_string()),
        ),
    ])
}

pub fn customer_key(customer_id: &str) -> Item {
    Item::from([(
        "customerId".to_string(),
        TypedValue::String(customer_id.to_string()),
    )])
}

pub fn schedule_key(customer_id: &str, schedule_name: &str) -> Item {
    Item::from([
        (
            "customerId".to_string(),
            TypedValue::String(customer_id.to_string()),
        ),
        (
            "Name".to_string(),
            TypedValue::String(schedule_name.to_string()),
        ),
    ])
}

pub fn library_key(workflow_id: &str) -> Item {
    Item::from([(
        "workflowId".to_string(),
        TypedValue::String(workflow_id.to_string()),
    )])
}

/// Exhaustively scans a table, following continuation keys until the store
/// stops returning them. An empty table yields an empty vec.
pub fn scan_all_raw(store: &dyn RecordStore, table: &str) -> Result<Vec<Item>, WorkflowError> {
    let mut raw_items = Vec::new();
    let mut start_key: Option<Item> = None;

    for _ in 0..MAX_SCAN_PAGES {
        let page = store
            .scan_page(table, start_key.as_ref())
            .map_err(|message| WorkflowError::StoreUnavailable { message })?;
        raw_items.extend(page.items);
        match page.last_evaluated_key {
            Some(key) => start_key = Some(key),
            None => return Ok(raw_items),
        }
    }

    Err(WorkflowError::ScanLimitExceeded {
        table: table.to_string(),
        pages: MAX_SCAN_PAGES,
    })
}

/// `scan_all_raw` with the type tags stripped from every item.
pub fn scan_all(
    store: &dyn RecordStore,
    table: &str,
) -> Result<Vec<Map<String, Value>>, WorkflowError> {
    scan_all_raw(store, table)?
        .iter()
        .map(|item| deserialize_item(item).map_err(WorkflowError::from))
        .collect()
}

/// `scan_all_raw` with typed decoding layered on top.
pub fn scan_all_as<T: DeserializeOwned>(
    store: &dyn RecordStore,
    table: &str,
) -> Result<Vec<T>, WorkflowError> {
    scan_all_raw(store, table)?
        .iter()
        .map(|item| from_item(item).map_err(WorkflowError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;

    /// Serves a fixed sequence of pages, asserting the caller carries the
    /// continuation key forward.
    struct PagedStore {
        pages: Vec<ScanPage>,
        served: Mutex<usize>,
    }

    impl PagedStore {
        fn new(page_sizes: &[usize]) -> Self {
            let mut next_id = 0usize;
            let page_count = page_sizes.len();
            let pages = page_sizes
                .iter()
                .enumerate()
                .map(|(page_index, size)| {
                    let items = (0..*size)
                        .map(|_| {
                            let item = Item::from([
                                (
                                    "customerId".to_string(),
                                    TypedValue::String(format!("customer-{next_id}")),
                                ),
                                ("rowId".to_string(), TypedValue::Number(next_id.to_string())),
                            ]);
                            next_id += 1;
                            item
                        })
                        .collect();
                    ScanPage {
                        items,
                        last_evaluated_key: (page_index + 1 < page_count)
                            .then(|| customer_key(&format!("customer-{}", next_id - 1))),
                    }
                })
                .collect();
            Self {
                pages,
                served: Mutex::new(0),
            }
        }
    }

    impl RecordStore for PagedStore {
        fn get_item(&self, _table: &str, _key: &Item) -> Result<Option<Item>, String> {
            unimplemented!("scan tests never fetch single items")
        }

        fn put_item(&self, _table: &str, _item: Item) -> Result<(), String> {
            unimplemented!("scan tests never write")
        }

        fn delete_item(&self, _table: &str, _key: &Item) -> Result<(), String> {
            unimplemented!("scan tests never delete")
        }

        fn scan_page(&self, _table: &str, start_key: Option<&Item>) -> Result<ScanPage, String> {
            let mut served = self.served.lock().expect("poisoned mutex");
            if *served == 0 {
                assert!(start_key.is_none(), "first page must not carry a start key");
            } else {
                let expected = self.pages[*served - 1]
                    .last_evaluated_key
                    .as_ref()
                    .expect("a further page implies a continuation key");
                assert_eq!(start_key, Some(expected));
            }
            let page = self.pages[*served].clone();
            *served += 1;
            Ok(page)
        }
    }

    #[test]
    fn accumulates_every_page_and_deserializes_each_item() {
        let store = PagedStore::new(&[1000, 1000, 7]);
        let records = scan_all(&store, "wfm-demoteam-Workflows-dev").expect("scan should pass");

        assert_eq!(records.len(), 2007);
        assert_eq!(records[0]["customerId"], json!("customer-0"));
        assert_eq!(records[0]["rowId"], json!(0));
        assert_eq!(records[2006]["customerId"], json!("customer-2006"));
        assert_eq!(records[2006]["rowId"], json!(2006));
    }

    #[test]
    fn empty_table_yields_an_empty_sequence() {
        let store = PagedStore::new(&[0]);
        let records = scan_all(&store, "wfm-demoteam-Workflows-dev").expect("scan should pass");
        assert!(records.is_empty());
    }

    /// A store that never stops returning continuation keys.
    struct EndlessStore;

    impl RecordStore for EndlessStore {
        fn get_item(&self, _table: &str, _key: &Item) -> Result<Option<Item>, String> {
            unimplemented!()
        }

        fn put_item(&self, _table: &str, _item: Item) -> Result<(), String> {
            unimplemented!()
        }

        fn delete_item(&self, _table: &str, _key: &Item) -> Result<(), String> {
            unimplemented!()
        }

        fn scan_page(&self, _table: &str, _start_key: Option<&Item>) -> Result<ScanPage, String> {
            Ok(ScanPage {
                items: vec![customer_key("repeat")],
                last_evaluated_key: Some(customer_key("repeat")),
            })
        }
    }

    #[test]
    fn non_terminating_pagination_fails_at_the_page_bound() {
        let error =
            scan_all(&EndlessStore, "wfm-demoteam-Workflows-dev").expect_err("scan should fail");
        assert_eq!(
            error,
            WorkflowError::ScanLimitExceeded {
                table: "wfm-demoteam-Workflows-dev".to_string(),
                pages: MAX_SCAN_PAGES,
            }
        );
    }

    #[test]
    fn typed_scan_decodes_into_contract_structs() {
        use wfm_core::contract::CustomerRecord;

        struct OnePage;
        impl RecordStore for OnePage {
            fn get_item(&self, _table: &str, _key: &Item) -> Result<Option<Item>, String> {
                unimplemented!()
            }
            fn put_item(&self, _table: &str, _item: Item) -> Result<(), String> {
                unimplemented!()
            }
            fn delete_item(&self, _table: &str, _key: &Item) -> Result<(), String> {
                unimplemented!()
            }
            fn scan_page(&self, _table: &str, _start: Option<&Item>) -> Result<ScanPage, String> {
                let item: Item = serde_json::from_value(json!({
                    "customerId": {"S": "democustomer"},
                    "endemicType": {"S": "A"},
                    "workflowManager": {"M": {"enableWorkflowLibrary": {"BOOL": true}}}
                }))
                .expect("wire item should parse");
                Ok(ScanPage {
                    items: vec![item],
                    last_evaluated_key: None,
                })
            }
        }

        let customers: Vec<CustomerRecord> =
            scan_all_as(&OnePage, "wfm-demoteam-CustomerConfig-dev").expect("scan should pass");
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].customer_id, "democustomer");
        assert!(customers[0].workflow_manager.enable_workflow_library);
    }
}
