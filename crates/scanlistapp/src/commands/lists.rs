use crate::commands::{CmdMessage, CmdResult};
use crate::error::{Result, ScanError};
use crate::handoff::backend::HandoffBackend;
use crate::handoff::HandoffChannel;
use crate::model::{require_non_empty, ItemMeta, ScanList};
use crate::store::DataStore;

pub fn create<S: DataStore, H: HandoffBackend>(
    store: &mut S,
    handoff: &HandoffChannel<H>,
    name: &str,
) -> Result<CmdResult> {
    let name = require_non_empty(name, "name")?;
    ensure_name_free(store, &name)?;

    let list = store.create_list(&name)?;
    handoff.add_known_list_id(&list.name);

    let mut result = CmdResult::default().with_lists(vec![list.clone()]);
    result.add_message(CmdMessage::success(format!("Created list '{}'", list.name)));
    Ok(result)
}

pub fn list<S: DataStore>(store: &S) -> Result<CmdResult> {
    let lists = store.list_all_lists()?;
    let mut result = CmdResult::default();
    if lists.is_empty() {
        result.add_message(CmdMessage::info("No lists yet."));
    }
    Ok(result.with_lists(lists))
}

/// Renames the list record only. Items stay filed under the old name.
pub fn rename<S: DataStore, H: HandoffBackend>(
    store: &mut S,
    handoff: &HandoffChannel<H>,
    name: &str,
    new_name: &str,
) -> Result<CmdResult> {
    let list = find(store, name)?;
    let new_name = require_non_empty(new_name, "name")?;
    if new_name == list.name {
        return Ok(CmdResult::default().with_lists(vec![list]));
    }
    ensure_name_free(store, &new_name)?;

    let renamed = store.rename_list(&list.id, &new_name)?;
    handoff.remove_known_list_id(&list.name);
    handoff.add_known_list_id(&renamed.name);

    let mut result = CmdResult::default().with_lists(vec![renamed.clone()]);
    result.add_message(CmdMessage::success(format!(
        "Renamed '{}' to '{}'",
        list.name, renamed.name
    )));
    Ok(result)
}

/// Deletes the list record once `confirmation` repeats its name exactly.
/// Items recorded under the name are kept.
pub fn delete<S: DataStore, H: HandoffBackend>(
    store: &mut S,
    handoff: &HandoffChannel<H>,
    name: &str,
    confirmation: &str,
) -> Result<CmdResult> {
    let list = find(store, name)?;
    if confirmation != list.name {
        return Err(ScanError::ConfirmationMismatch {
            expected: list.name,
        });
    }

    store.delete_list(&list.id)?;
    handoff.remove_known_list_id(&list.name);

    let kept = store.find_items(&list.name)?.len();
    let mut result = CmdResult::default().with_lists(vec![list.clone()]);
    result.add_message(CmdMessage::success(format!("Deleted list '{}'", list.name)));
    if kept > 0 {
        result.add_message(CmdMessage::info(format!(
            "{} stay on disk under '{}'",
            super::plural(kept, "item", "items"),
            list.name
        )));
    }
    Ok(result)
}

/// Sets the metadata stamped on future scans into the list.
pub fn set_meta<S: DataStore>(
    store: &mut S,
    name: &str,
    item_name: Option<String>,
    supplier_name: Option<String>,
) -> Result<CmdResult> {
    let mut list = find(store, name)?;
    list.meta = ItemMeta::new(item_name, supplier_name);
    store.save_list(&list)?;

    let mut result = CmdResult::default().with_lists(vec![list.clone()]);
    let message = if list.meta.is_empty() {
        format!("Cleared metadata of '{}'", list.name)
    } else {
        format!("Updated metadata of '{}'", list.name)
    };
    result.add_message(CmdMessage::success(message));
    Ok(result)
}

pub(crate) fn find<S: DataStore>(store: &S, name: &str) -> Result<ScanList> {
    let name = require_non_empty(name, "name")?;
    store
        .find_list_by_name(&name)?
        .ok_or(ScanError::ListNotFound(name))
}

fn ensure_name_free<S: DataStore>(store: &S, name: &str) -> Result<()> {
    if store.find_list_by_name(name)?.is_some() {
        return Err(ScanError::Validation {
            field: "name",
            reason: format!("a list named '{}' already exists", name),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handoff::mem_handoff::MemHandoff;
    use crate::model::ScanItem;
    use crate::store::mem_backend::MemBackend;
    use crate::store::scan_store::ScanStore;
    use chrono::Utc;
    use uuid::Uuid;

    fn setup() -> (ScanStore<MemBackend>, HandoffChannel<MemHandoff>) {
        (
            ScanStore::with_backend(MemBackend::new()),
            HandoffChannel::new(MemHandoff::new()),
        )
    }

    fn item(list: &str) -> ScanItem {
        let now = Utc::now();
        ScanItem {
            id: Uuid::new_v4(),
            list_id: list.into(),
            code_raw: "1".into(),
            code_type: "QR".into(),
            label: None,
            created_at: now,
            updated_at: now,
            seq: 0,
            meta: None,
        }
    }

    #[test]
    fn create_trims_and_registers_known_name() {
        let (mut store, handoff) = setup();
        let result = create(&mut store, &handoff, "  Warehouse A  ").unwrap();

        assert_eq!(result.lists[0].name, "Warehouse A");
        assert!(store.find_list_by_name("Warehouse A").unwrap().is_some());
        assert_eq!(handoff.known_list_ids(), vec!["Warehouse A"]);
    }

    #[test]
    fn create_rejects_blank_and_duplicate() {
        let (mut store, handoff) = setup();
        assert!(matches!(
            create(&mut store, &handoff, ""),
            Err(ScanError::Validation { field: "name", .. })
        ));

        create(&mut store, &handoff, "A").unwrap();
        assert!(create(&mut store, &handoff, " A ").is_err());
        // Only exact matches collide
        create(&mut store, &handoff, "a").unwrap();
        assert_eq!(store.list_all_lists().unwrap().len(), 2);
    }

    #[test]
    fn list_reports_empty_state() {
        let (store, _) = setup();
        let result = list(&store).unwrap();
        assert!(result.lists.is_empty());
        assert_eq!(result.messages[0].content, "No lists yet.");
    }

    #[test]
    fn rename_updates_known_lists_but_not_items() {
        let (mut store, handoff) = setup();
        create(&mut store, &handoff, "Old").unwrap();
        store.insert_item(&item("Old")).unwrap();

        rename(&mut store, &handoff, "Old", "New").unwrap();

        assert!(store.find_list_by_name("Old").unwrap().is_none());
        assert_eq!(handoff.known_list_ids(), vec!["New"]);
        assert_eq!(store.find_items("Old").unwrap().len(), 1);
        assert!(store.find_items("New").unwrap().is_empty());
    }

    #[test]
    fn rename_to_taken_name_fails() {
        let (mut store, handoff) = setup();
        create(&mut store, &handoff, "A").unwrap();
        create(&mut store, &handoff, "B").unwrap();
        assert!(rename(&mut store, &handoff, "A", "B").is_err());
        assert!(matches!(
            rename(&mut store, &handoff, "missing", "C"),
            Err(ScanError::ListNotFound(_))
        ));
    }

    #[test]
    fn delete_requires_exact_confirmation() {
        let (mut store, handoff) = setup();
        create(&mut store, &handoff, "Dock").unwrap();

        let err = delete(&mut store, &handoff, "Dock", "dock").unwrap_err();
        assert!(matches!(err, ScanError::ConfirmationMismatch { .. }));
        assert!(store.find_list_by_name("Dock").unwrap().is_some());

        delete(&mut store, &handoff, "Dock", "Dock").unwrap();
        assert!(store.find_list_by_name("Dock").unwrap().is_none());
        assert!(handoff.known_list_ids().is_empty());
    }

    #[test]
    fn deleted_list_items_reappear_with_same_name() {
        let (mut store, handoff) = setup();
        create(&mut store, &handoff, "Dock").unwrap();
        store.insert_item(&item("Dock")).unwrap();

        let result = delete(&mut store, &handoff, "Dock", "Dock").unwrap();
        assert_eq!(result.messages.len(), 2);

        create(&mut store, &handoff, "Dock").unwrap();
        assert_eq!(store.find_items("Dock").unwrap().len(), 1);
    }

    #[test]
    fn set_meta_normalizes_blanks() {
        let (mut store, handoff) = setup();
        create(&mut store, &handoff, "Dock").unwrap();

        set_meta(&mut store, "Dock", Some("Bolts".into()), Some(" ".into())).unwrap();
        let meta = store.find_list_by_name("Dock").unwrap().unwrap().meta;
        assert_eq!(meta.item_name.as_deref(), Some("Bolts"));
        assert_eq!(meta.supplier_name, None);
    }
}
