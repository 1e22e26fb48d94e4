//! # Command Layer
//!
//! The business logic of every facade operation lives here, one submodule per
//! area. Commands take the store, the handoff channel or the ingestion service
//! they need as arguments and return a [`CmdResult`].
//!
//! Commands do no terminal I/O and never prompt. Confirmation for destructive
//! operations is passed in as data (see [`lists::delete`]); the UI decides how
//! to ask for it.
//!
//! ## Command Modules
//!
//! - [`lists`]: create, rename, delete, tag and list scan lists
//! - [`items`]: scan, list, relabel and delete items
//! - [`export`]: CSV text and CSV files
//! - [`pending`]: the cross-process capture/commit/insert workflow
//! - [`known`]: the shared set of list names
//! - [`config`]: show configuration
//! - [`helpers`]: item selectors

use crate::config::ScanlistConfig;
use crate::model::{PendingBatch, ScanItem, ScanList};
use crate::route::Activation;
use serde::Serialize;
use std::path::PathBuf;

pub mod config;
pub mod export;
pub mod helpers;
pub mod items;
pub mod known;
pub mod lists;
pub mod pending;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct CmdResult {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub affected_items: Vec<ScanItem>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub listed_items: Vec<ScanItem>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lists: Vec<ScanList>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending: Option<PendingBatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activation: Option<Activation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<ScanlistConfig>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected_items(mut self, items: Vec<ScanItem>) -> Self {
        self.affected_items = items;
        self
    }

    pub fn with_listed_items(mut self, items: Vec<ScanItem>) -> Self {
        self.listed_items = items;
        self
    }

    pub fn with_lists(mut self, lists: Vec<ScanList>) -> Self {
        self.lists = lists;
        self
    }

    pub fn with_names(mut self, names: Vec<String>) -> Self {
        self.names = names;
        self
    }

    pub fn with_pending(mut self, batch: PendingBatch) -> Self {
        self.pending = Some(batch);
        self
    }

    pub fn with_text(mut self, text: String) -> Self {
        self.text = Some(text);
        self
    }

    pub fn with_export_path(mut self, path: PathBuf) -> Self {
        self.export_path = Some(path);
        self
    }

    pub fn with_activation(mut self, activation: Activation) -> Self {
        self.activation = Some(activation);
        self
    }

    pub fn with_config(mut self, config: ScanlistConfig) -> Self {
        self.config = Some(config);
        self
    }
}

pub(crate) fn plural(count: usize, one: &str, many: &str) -> String {
    if count == 1 {
        format!("1 {}", one)
    } else {
        format!("{} {}", count, many)
    }
}
