use crate::commands::helpers::{resolve_item, ItemSelector};
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{Result, ScanError};
use crate::ingest::ScanService;
use crate::model::{normalize_label, require_non_empty};
use crate::store::DataStore;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Record one scan through the deduplicating service.
pub fn add<S: DataStore>(
    service: &ScanService<S>,
    list_id: &str,
    code_raw: &str,
    code_type: &str,
    label: Option<String>,
) -> Result<CmdResult> {
    let item = service.add_scan(list_id, code_raw, code_type, label)?;
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Saved {} to '{}'",
        item.code_raw, item.list_id
    )));
    Ok(result.with_affected_items(vec![item]))
}

pub fn list<S: DataStore>(store: &S, list_id: &str) -> Result<CmdResult> {
    let list_id = require_non_empty(list_id, "listId")?;
    let items = store.find_items(&list_id)?;
    let mut result = CmdResult::default();
    if items.is_empty() {
        result.add_message(CmdMessage::info(format!("No items in '{}'.", list_id)));
    }
    Ok(result.with_listed_items(items))
}

pub fn update_label<S: DataStore>(
    store: &mut S,
    id: &Uuid,
    label: Option<String>,
    at: DateTime<Utc>,
) -> Result<CmdResult> {
    let item = store.update_item_label(id, normalize_label(label), at)?;
    let mut result = CmdResult::default();
    let message = match &item.label {
        Some(label) => format!("Labelled {} as '{}'", item.code_raw, label),
        None => format!("Cleared label of {}", item.code_raw),
    };
    result.add_message(CmdMessage::success(message));
    Ok(result.with_affected_items(vec![item]))
}

pub fn delete<S: DataStore>(store: &mut S, id: &Uuid) -> Result<CmdResult> {
    let item = store.find_item(id)?.ok_or(ScanError::ItemNotFound(*id))?;
    store.delete_item(id)?;
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Deleted {} from '{}'",
        item.code_raw, item.list_id
    )));
    Ok(result.with_affected_items(vec![item]))
}

/// Turn a user-facing selector into an item id.
pub fn resolve<S: DataStore>(store: &S, list_id: &str, selector: ItemSelector) -> Result<Uuid> {
    Ok(resolve_item(store, list_id, selector)?.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::ingest::IngestSettings;
    use crate::store::mem_backend::MemBackend;
    use crate::store::scan_store::ScanStore;
    use crate::store::shared;
    use crate::telemetry::RecordingTelemetry;
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::Arc;

    fn service() -> (ScanService<ScanStore<MemBackend>>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc.timestamp_opt(1_700_000_000, 0).unwrap()));
        let service = ScanService::with_parts(
            shared(ScanStore::with_backend(MemBackend::new())),
            IngestSettings::default(),
            clock.clone(),
            Arc::new(RecordingTelemetry::new()),
        );
        (service, clock)
    }

    #[test]
    fn add_then_list_newest_first() {
        let (service, clock) = service();
        add(&service, "L1", "first", "QR", None).unwrap();
        clock.advance(Duration::seconds(5));
        add(&service, "L1", "second", "QR", None).unwrap();

        let result = list(&*service.store().lock(), "L1").unwrap();
        let codes: Vec<_> = result.listed_items.iter().map(|i| i.code_raw.as_str()).collect();
        assert_eq!(codes, vec!["second", "first"]);
    }

    #[test]
    fn duplicate_scan_surfaces_as_error() {
        let (service, _) = service();
        add(&service, "L1", "1", "QR", None).unwrap();
        assert!(add(&service, "L1", "1", "QR", None).unwrap_err().is_duplicate());
    }

    #[test]
    fn blank_label_clears() {
        let (service, _) = service();
        let added = add(&service, "L1", "1", "QR", Some("box".into())).unwrap();
        let id = added.affected_items[0].id;

        let mut store = service.store().lock();
        let result = update_label(&mut *store, &id, Some("   ".into()), service.now()).unwrap();
        assert_eq!(result.affected_items[0].label, None);
        assert_eq!(store.find_item(&id).unwrap().unwrap().label, None);
    }

    #[test]
    fn resolve_by_position_then_delete() {
        let (service, clock) = service();
        add(&service, "L1", "old", "QR", None).unwrap();
        clock.advance(Duration::seconds(5));
        add(&service, "L1", "new", "QR", None).unwrap();

        let mut store = service.store().lock();
        let id = resolve(&*store, "L1", ItemSelector::Index(2)).unwrap();
        let result = delete(&mut *store, &id).unwrap();
        assert_eq!(result.affected_items[0].code_raw, "old");
        assert!(matches!(
            delete(&mut *store, &id),
            Err(ScanError::ItemNotFound(_))
        ));
        assert!(resolve(&*store, "L1", ItemSelector::Index(2)).is_err());
    }
}
