use crate::error::{Result, ScanError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Code type recorded for values typed in by hand.
pub const CODE_TYPE_MANUAL: &str = "MANUAL";
/// Code type recorded when the decoder did not report a symbology.
pub const CODE_TYPE_UNKNOWN: &str = "UNKNOWN";

pub const ITEM_META_VERSION: u32 = 1;

/// Trims `value` and rejects it if nothing is left.
pub fn require_non_empty(value: &str, field: &'static str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ScanError::blank(field));
    }
    Ok(trimmed.to_string())
}

/// Blank labels are stored as "no label", never as an empty string.
pub fn normalize_label(label: Option<String>) -> Option<String> {
    label
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    Single,
    Multi,
}

impl ScanMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanMode::Single => "single",
            ScanMode::Multi => "multi",
        }
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScanMode {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "single" => Ok(ScanMode::Single),
            "multi" => Ok(ScanMode::Multi),
            other => Err(ScanError::Validation {
                field: "mode",
                reason: format!("unknown scan mode '{}'", other),
            }),
        }
    }
}

/// Typed metadata a list stamps onto the items scanned into it.
///
/// The key set is fixed; new keys get a new field and a version bump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemMeta {
    #[serde(default = "current_meta_version")]
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier_name: Option<String>,
}

fn current_meta_version() -> u32 {
    ITEM_META_VERSION
}

impl Default for ItemMeta {
    fn default() -> Self {
        Self {
            version: ITEM_META_VERSION,
            item_name: None,
            supplier_name: None,
        }
    }
}

impl ItemMeta {
    pub fn new(item_name: Option<String>, supplier_name: Option<String>) -> Self {
        Self {
            version: ITEM_META_VERSION,
            item_name: normalize_label(item_name),
            supplier_name: normalize_label(supplier_name),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.item_name.is_none() && self.supplier_name.is_none()
    }

    /// `None` when there is nothing worth attaching to an item.
    pub fn non_empty(&self) -> Option<ItemMeta> {
        if self.is_empty() {
            None
        } else {
            Some(self.clone())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanList {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub meta: ItemMeta,
}

impl ScanList {
    pub fn new(name: &str) -> Result<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            name: require_non_empty(name, "name")?,
            created_at: Utc::now(),
            meta: ItemMeta::default(),
        })
    }
}

/// One durably stored scan record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanItem {
    pub id: Uuid,
    pub list_id: String,
    pub code_raw: String,
    pub code_type: String,
    pub label: Option<String>,
    pub created_at: DateTime<Utc>,
    // Timestamp of the scan (or edit) that last wrote label/meta
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub seq: u64,
    #[serde(default)]
    pub meta: Option<ItemMeta>,
}

/// An item about to be written; the store assigns `id` and `seq`.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDraft {
    pub list_id: String,
    pub code_raw: String,
    pub code_type: String,
    pub label: Option<String>,
    pub created_at: DateTime<Utc>,
    pub meta: Option<ItemMeta>,
}

impl ItemDraft {
    pub fn into_item(self, seq: u64) -> ScanItem {
        ScanItem {
            id: Uuid::new_v4(),
            list_id: self.list_id,
            code_raw: self.code_raw,
            code_type: self.code_type,
            label: self.label,
            created_at: self.created_at,
            updated_at: self.created_at,
            seq,
            meta: self.meta,
        }
    }

    pub fn matches(&self, item: &ScanItem) -> bool {
        item.list_id == self.list_id
            && item.code_raw == self.code_raw
            && item.code_type == self.code_type
    }
}

/// A decoded value that has not been committed to the store yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub value: String,
    pub symbology: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Candidate {
    pub fn new(value: impl Into<String>, symbology: Option<String>) -> Self {
        Self::at(value, symbology, Utc::now())
    }

    pub fn at(value: impl Into<String>, symbology: Option<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            symbology,
            timestamp,
        }
    }

    pub fn code_type(&self) -> String {
        self.symbology
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(CODE_TYPE_UNKNOWN)
            .to_string()
    }
}

/// Captures waiting in the handoff channel for the next active process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingBatch {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub mode: Option<ScanMode>,
    #[serde(default)]
    pub list_id: Option<String>,
}

impl PendingBatch {
    pub fn new(candidates: Vec<Candidate>, mode: Option<ScanMode>, list_id: Option<String>) -> Self {
        Self {
            candidates,
            mode,
            list_id,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn values(&self) -> Vec<&str> {
        self.candidates.iter().map(|c| c.value.as_str()).collect()
    }
}
