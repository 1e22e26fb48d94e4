use crate::error::{Result, ScanError};
use crate::model::ScanItem;
use crate::store::DataStore;
use std::str::FromStr;
use uuid::Uuid;

/// How the user points at an item: by its 1-based position in the list's
/// newest-first listing, or by its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemSelector {
    Index(usize),
    Id(Uuid),
}

impl FromStr for ItemSelector {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(index) = s.parse::<usize>() {
            if index == 0 {
                return Err(ScanError::Validation {
                    field: "item",
                    reason: "positions start at 1".to_string(),
                });
            }
            return Ok(ItemSelector::Index(index));
        }
        Uuid::parse_str(s)
            .map(ItemSelector::Id)
            .map_err(|_| ScanError::Validation {
                field: "item",
                reason: format!("'{}' is neither a position nor an item id", s),
            })
    }
}

pub fn resolve_item<S: DataStore>(store: &S, list_id: &str, selector: ItemSelector) -> Result<ScanItem> {
    match selector {
        ItemSelector::Index(index) => store
            .find_items(list_id.trim())?
            .into_iter()
            .nth(index - 1)
            .ok_or_else(|| ScanError::Validation {
                field: "item",
                reason: format!("list '{}' has no item #{}", list_id.trim(), index),
            }),
        ItemSelector::Id(id) => store.find_item(&id)?.ok_or(ScanError::ItemNotFound(id)),
    }
}
