//! CSV serialization of scan items.
//!
//! Columns are fixed: `id,listId,codeRaw,codeType,label,createdAt`. Rows are
//! joined with `\n` and the output has no trailing newline. A field is quoted
//! only when it contains the delimiter, a double quote, `\n` or `\r`; quotes
//! inside a quoted field are doubled.

use crate::error::{Result, ScanError};
use crate::model::ScanItem;
use chrono::SecondsFormat;

pub const HEADER_FIELDS: [&str; 6] = ["id", "listId", "codeRaw", "codeType", "label", "createdAt"];
pub const DEFAULT_DELIMITER: char = ',';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
    pub delimiter: char,
    pub include_header: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            include_header: true,
        }
    }
}

impl CsvOptions {
    /// Options with `delimiter` and a header row. Rejects delimiters that
    /// collide with quoting or row separation.
    pub fn new(delimiter: char) -> Result<Self> {
        let options = Self {
            delimiter,
            ..Self::default()
        };
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if matches!(self.delimiter, '"' | '\n' | '\r') {
            return Err(ScanError::Validation {
                field: "delimiter",
                reason: format!("{:?} cannot separate CSV fields", self.delimiter),
            });
        }
        Ok(())
    }
}

/// Items are written in the order given.
pub fn to_csv(items: &[ScanItem], options: &CsvOptions) -> String {
    let mut rows = Vec::with_capacity(items.len() + 1);
    if options.include_header {
        rows.push(join_row(HEADER_FIELDS.iter().copied(), options.delimiter));
    }

    for item in items {
        let id = item.id.to_string();
        let created_at = item.created_at.to_rfc3339_opts(SecondsFormat::Millis, true);
        let fields = [
            id.as_str(),
            item.list_id.as_str(),
            item.code_raw.as_str(),
            item.code_type.as_str(),
            item.label.as_deref().unwrap_or(""),
            created_at.as_str(),
        ];
        rows.push(join_row(fields.into_iter(), options.delimiter));
    }

    rows.join("\n")
}

fn join_row<'a>(fields: impl Iterator<Item = &'a str>, delimiter: char) -> String {
    fields
        .map(|f| escape_field(f, delimiter))
        .collect::<Vec<_>>()
        .join(delimiter.to_string().as_str())
}

pub fn escape_field(field: &str, delimiter: char) -> String {
    let needs_quotes = field
        .chars()
        .any(|c| c == delimiter || c == '"' || c == '\n' || c == '\r');
    if needs_quotes {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
