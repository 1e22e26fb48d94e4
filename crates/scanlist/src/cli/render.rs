use chrono::{DateTime, Utc};
use colored::Colorize;
use scanlistapp::commands::{CmdMessage, MessageLevel};
use scanlistapp::config::ScanlistConfig;
use scanlistapp::model::{PendingBatch, ScanItem, ScanList};
use scanlistapp::route::Activation;
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const TIME_WIDTH: usize = 16;
const CODE_WIDTH: usize = 28;

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

pub(super) fn print_lists(lists: &[ScanList]) {
    for list in lists {
        let meta = list_meta_summary(list);
        let left = if meta.is_empty() {
            list.name.clone()
        } else {
            format!("{}  {}", list.name, meta)
        };
        let available = LINE_WIDTH.saturating_sub(TIME_WIDTH + 2);
        let shown = truncate_to_width(&left, available);
        let padding = available.saturating_sub(shown.width());

        println!(
            "  {}{}{}",
            shown.bold(),
            " ".repeat(padding),
            format_time_ago(list.created_at).dimmed()
        );
    }
}

pub(super) fn print_items(items: &[ScanItem]) {
    for (n, item) in items.iter().enumerate() {
        let (index, code, rest) = item_columns(n + 1, item);
        let fixed = index.width() + CODE_WIDTH + TIME_WIDTH + 2;
        let available = LINE_WIDTH.saturating_sub(fixed);
        let rest = truncate_to_width(&rest, available);
        let padding = available.saturating_sub(rest.width());

        println!(
            "{}{}{}{}{}",
            index.yellow(),
            code,
            rest,
            " ".repeat(padding),
            format_time_ago(item.created_at).dimmed()
        );
    }
}

pub(super) fn print_pending(batch: &PendingBatch) {
    if batch.is_empty() {
        return;
    }
    let mode = batch.mode.map(|m| m.to_string()).unwrap_or_else(|| "-".into());
    let list = batch.list_id.as_deref().unwrap_or("-");
    println!("{} {}  {} {}", "mode:".dimmed(), mode, "list:".dimmed(), list);
    for candidate in &batch.candidates {
        println!(
            "  {}  {}",
            candidate.value,
            candidate.code_type().dimmed()
        );
    }
}

pub(super) fn print_names(names: &[String]) {
    for name in names {
        println!("  {}", name);
    }
}

pub(super) fn print_activation(activation: &Activation) {
    println!("{} {}", "action:".dimmed(), activation.action);
    println!("{} {}", "mode:".dimmed(), activation.mode);
}

pub(super) fn print_config(config: &ScanlistConfig) {
    let width = config.entries().iter().map(|(k, _)| k.width()).max().unwrap_or(0);
    for (key, value) in config.entries() {
        println!("{}  {}", format!("{:width$}", key, width = width).cyan(), value);
    }
}

/// Index column, padded code column and the label/type remainder.
fn item_columns(position: usize, item: &ScanItem) -> (String, String, String) {
    let index = format!("{:>4}. ", position);
    let code = truncate_to_width(&item.code_raw, CODE_WIDTH - 1);
    let code = format!("{}{}", code, " ".repeat(CODE_WIDTH - code.width()));
    let rest = match &item.label {
        Some(label) => format!("{} [{}]", label, item.code_type),
        None => format!("[{}]", item.code_type),
    };
    (index, code, rest)
}

fn list_meta_summary(list: &ScanList) -> String {
    [list.meta.item_name.as_deref(), list.meta.supplier_name.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" / ")
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let time_str = Formatter::new().convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
