use super::backend::StorageBackend;
use super::{not_found_list, DataStore, Upserted, Window};
use crate::error::{Result, ScanError};
use crate::model::{require_non_empty, ItemDraft, ScanItem, ScanList};
use chrono::{DateTime, Utc};
use std::cmp::Reverse;
use std::collections::HashMap;
use std::path::PathBuf;
use uuid::Uuid;

pub struct ScanStore<B: StorageBackend> {
    /// The underlying storage backend.
    pub(crate) backend: B,
}

impl<B: StorageBackend> ScanStore<B> {
    pub fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn next_seq(items: &HashMap<Uuid, ScanItem>) -> u64 {
        items.values().map(|i| i.seq).max().map_or(1, |max| max + 1)
    }
}

fn newest_first_lists(mut lists: Vec<ScanList>) -> Vec<ScanList> {
    lists.sort_by_key(|l| Reverse((l.created_at, l.id)));
    lists
}

fn newest_first_items(mut items: Vec<ScanItem>) -> Vec<ScanItem> {
    items.sort_by_key(|i| Reverse((i.created_at, i.seq)));
    items
}

impl<B: StorageBackend> DataStore for ScanStore<B> {
    fn create_list(&mut self, name: &str) -> Result<ScanList> {
        let list = ScanList::new(name)?;
        let _lock = self.backend.lock()?;

        let mut lists = self.backend.load_lists()?;
        lists.insert(list.id, list.clone());
        self.backend.save_lists(&lists)?;

        Ok(list)
    }

    fn save_list(&mut self, list: &ScanList) -> Result<()> {
        let _lock = self.backend.lock()?;
        let mut lists = self.backend.load_lists()?;
        if !lists.contains_key(&list.id) {
            return Err(not_found_list(&list.id));
        }
        lists.insert(list.id, list.clone());
        self.backend.save_lists(&lists)
    }

    fn list_all_lists(&self) -> Result<Vec<ScanList>> {
        let lists = self.backend.load_lists()?;
        Ok(newest_first_lists(lists.into_values().collect()))
    }

    fn find_list_by_name(&self, name: &str) -> Result<Option<ScanList>> {
        let name = name.trim();
        Ok(self
            .list_all_lists()?
            .into_iter()
            .find(|l| l.name == name))
    }

    fn find_list(&self, id: &Uuid) -> Result<Option<ScanList>> {
        Ok(self.backend.load_lists()?.remove(id))
    }

    fn delete_list(&mut self, id: &Uuid) -> Result<()> {
        let _lock = self.backend.lock()?;
        let mut lists = self.backend.load_lists()?;
        if lists.remove(id).is_none() {
            return Err(not_found_list(id));
        }
        self.backend.save_lists(&lists)
    }

    fn rename_list(&mut self, id: &Uuid, new_name: &str) -> Result<ScanList> {
        let new_name = require_non_empty(new_name, "name")?;
        let _lock = self.backend.lock()?;

        let mut lists = self.backend.load_lists()?;
        let list = lists.get_mut(id).ok_or_else(|| not_found_list(id))?;
        list.name = new_name;
        let renamed = list.clone();
        self.backend.save_lists(&lists)?;

        Ok(renamed)
    }

    fn insert_item(&mut self, item: &ScanItem) -> Result<ScanItem> {
        require_non_empty(&item.list_id, "listId")?;
        require_non_empty(&item.code_raw, "codeRaw")?;
        require_non_empty(&item.code_type, "codeType")?;

        let _lock = self.backend.lock()?;
        let mut items = self.backend.load_items()?;
        let mut stored = item.clone();
        stored.seq = Self::next_seq(&items);
        items.insert(stored.id, stored.clone());
        self.backend.save_items(&items)?;

        Ok(stored)
    }

    fn find_items(&self, list_id: &str) -> Result<Vec<ScanItem>> {
        let items = self.backend.load_items()?;
        Ok(newest_first_items(
            items
                .into_values()
                .filter(|i| i.list_id == list_id)
                .collect(),
        ))
    }

    fn find_item(&self, id: &Uuid) -> Result<Option<ScanItem>> {
        Ok(self.backend.load_items()?.remove(id))
    }

    fn update_item_label(
        &mut self,
        id: &Uuid,
        label: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<ScanItem> {
        let _lock = self.backend.lock()?;
        let mut items = self.backend.load_items()?;
        let item = items.get_mut(id).ok_or(ScanError::ItemNotFound(*id))?;
        item.label = label;
        item.updated_at = at.max(item.updated_at);
        let updated = item.clone();
        self.backend.save_items(&items)?;

        Ok(updated)
    }

    fn delete_item(&mut self, id: &Uuid) -> Result<()> {
        let _lock = self.backend.lock()?;
        let mut items = self.backend.load_items()?;
        if items.remove(id).is_none() {
            return Err(ScanError::ItemNotFound(*id));
        }
        self.backend.save_items(&items)
    }

    fn upsert_item(&mut self, draft: ItemDraft, window: Window) -> Result<Upserted> {
        let _lock = self.backend.lock()?;
        let mut items = self.backend.load_items()?;

        // Oldest match first so repeated merges always land on the same record
        let existing = items
            .values()
            .filter(|i| draft.matches(i) && window.contains(i.created_at))
            .min_by_key(|i| (i.created_at, i.seq))
            .map(|i| i.id);

        let Some(id) = existing else {
            let item = draft.into_item(Self::next_seq(&items));
            items.insert(item.id, item.clone());
            self.backend.save_items(&items)?;
            return Ok(Upserted::Inserted(item));
        };

        let Some(item) = items.get_mut(&id) else {
            return Err(ScanError::ItemNotFound(id));
        };

        // A write carrying an older scan time must not clobber a newer one
        let stale = draft.created_at < item.updated_at;
        let differs = item.label != draft.label || item.meta != draft.meta;
        if stale || !differs {
            return Ok(Upserted::Merged {
                item: item.clone(),
                changed: false,
            });
        }

        item.label = draft.label;
        item.meta = draft.meta;
        item.updated_at = draft.created_at;
        let merged = item.clone();
        self.backend.save_items(&items)?;

        Ok(Upserted::Merged {
            item: merged,
            changed: true,
        })
    }

    fn location(&self) -> PathBuf {
        self.backend.location()
    }
}
