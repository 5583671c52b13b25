use std::collections::BTreeMap;
use std::sync::Mutex;

use wfm_core::record::{Item, TypedValue};

use super::record_store::{RecordStore, ScanPage};

/// In-memory [`RecordStore`] used by tests and local experiments.
///
/// Tables are declared up front with their key attributes; items are held
/// under a composite string key derived from those attributes, so the same
/// composite-key semantics apply as against the real store.
#[derive(Default)]
pub struct MemoryRecordStore {
    tables: Mutex<BTreeMap<String, TableData>>,
}

#[derive(Default)]
struct TableData {
    key_attributes: Vec<String>,
    items: BTreeMap<String, Item>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_table(&self, table: &str, key_attributes: &[&str]) {
        let mut tables = self.tables.lock().expect("poisoned mutex");
        tables.insert(
            table.to_string(),
            TableData {
                key_attributes: key_attributes.iter().map(|name| name.to_string()).collect(),
                items: BTreeMap::new(),
            },
        );
    }

    /// Every item currently stored in the table, for assertions.
    pub fn items(&self, table: &str) -> Vec<Item> {
        let tables = self.tables.lock().expect("poisoned mutex");
        tables
            .get(table)
            .map(|data| data.items.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, table: &str, key: &Item) -> bool {
        let tables = self.tables.lock().expect("poisoned mutex");
        let Some(data) = tables.get(table) else {
            return false;
        };
        composite_key(&data.key_attributes, key)
            .map(|composite| data.items.contains_key(&composite))
            .unwrap_or(false)
    }
}

fn composite_key(key_attributes: &[String], item: &Item) -> Result<String, String> {
    let mut parts = Vec::with_capacity(key_attributes.len());
    for attribute in key_attributes {
        match item.get(attribute) {
            Some(TypedValue::String(text)) => parts.push(text.clone()),
            Some(_) => return Err(format!("key attribute {attribute} must be a string")),
            None => return Err(format!("item is missing key attribute {attribute}")),
        }
    }
    Ok(parts.join("\u{1f}"))
}

impl RecordStore for MemoryRecordStore {
    fn get_item(&self, table: &str, key: &Item) -> Result<Option<Item>, String> {
        let tables = self.tables.lock().expect("poisoned mutex");
        let data = tables
            .get(table)
            .ok_or_else(|| format!("table not found: {table}"))?;
        let composite = composite_key(&data.key_attributes, key)?;
        Ok(data.items.get(&composite).cloned())
    }

    fn put_item(&self, table: &str, item: Item) -> Result<(), String> {
        let mut tables = self.tables.lock().expect("poisoned mutex");
        let data = tables
            .get_mut(table)
            .ok_or_else(|| format!("table not found: {table}"))?;
        let composite = composite_key(&data.key_attributes, &item)?;
        data.items.insert(composite, item);
        Ok(())
    }

    fn delete_item(&self, table: &str, key: &Item) -> Result<(), String> {
        let mut tables = self.tables.lock().expect("poisoned mutex");
        let data = tables
            .get_mut(table)
            .ok_or_else(|| format!("table not found: {table}"))?;
        let composite = composite_key(&data.key_attributes, key)?;
        data.items.remove(&composite);
        Ok(())
    }

    fn scan_page(&self, table: &str, _start_key: Option<&Item>) -> Result<ScanPage, String> {
        let tables = self.tables.lock().expect("poisoned mutex");
        let data = tables
            .get(table)
            .ok_or_else(|| format!("table not found: {table}"))?;
        Ok(ScanPage {
            items: data.items.values().cloned().collect(),
            last_evaluated_key: None,
        })
    }
}
