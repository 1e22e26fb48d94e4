use crate::commands::{CmdMessage, CmdResult};
use crate::error::{Result, ScanError};
use crate::export::{to_csv, CsvOptions};
use crate::model::require_non_empty;
use crate::store::DataStore;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Items of the list in the order exports write them.
pub fn items<S: DataStore>(store: &S, list_id: &str) -> Result<CmdResult> {
    let list_id = require_non_empty(list_id, "listId")?;
    Ok(CmdResult::default().with_listed_items(store.find_items(&list_id)?))
}

pub fn csv<S: DataStore>(store: &S, list_id: &str, options: &CsvOptions) -> Result<CmdResult> {
    options.validate()?;
    let list_id = require_non_empty(list_id, "listId")?;
    let items = store.find_items(&list_id)?;
    let text = to_csv(&items, options);
    Ok(CmdResult::default().with_listed_items(items).with_text(text))
}

/// Write the list as a CSV file into `dir` and report its path.
pub fn to_dir<S: DataStore>(
    store: &S,
    list_id: &str,
    options: &CsvOptions,
    dir: &Path,
) -> Result<CmdResult> {
    options.validate()?;
    let list_id = require_non_empty(list_id, "listId")?;
    let items = store.find_items(&list_id)?;
    let path = dir.join(file_name(&list_id, Utc::now()));
    write_atomic(&path, &to_csv(&items, options))?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Exported {} to {}",
        super::plural(items.len(), "item", "items"),
        path.display()
    )));
    Ok(result.with_listed_items(items).with_export_path(path))
}

pub fn file_name(list_id: &str, at: DateTime<Utc>) -> String {
    format!(
        "scan-items-{}-{}.csv",
        sanitize_filename(list_id),
        at.format("%Y%m%d-%H%M%S")
    )
}

fn sanitize_filename(name: &str) -> String {
    let safe: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if safe.is_empty() {
        "list".to_string()
    } else {
        safe
    }
}

fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let dir = path.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&dir).map_err(ScanError::persistence)?;

    let tmp = dir.join(format!(".export-{}.tmp", Uuid::new_v4()));
    fs::write(&tmp, content).map_err(ScanError::persistence)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(ScanError::persistence(e));
    }
    Ok(())
}
