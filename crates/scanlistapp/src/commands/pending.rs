//! The capture surface and the keyboard never call each other. The capture
//! side stages what it decoded; whoever runs next either commits the batch to
//! the store or types it out.

use crate::commands::{plural, CmdMessage, CmdResult};
use crate::error::Result;
use crate::handoff::backend::HandoffBackend;
use crate::handoff::{HandoffChannel, RetryPolicy};
use crate::ingest::ScanService;
use crate::model::{normalize_label, Candidate, PendingBatch, ScanMode};
use crate::store::DataStore;
use crate::text::batch_text;

/// Publish a capture session for the next consumer.
pub fn stage<H: HandoffBackend>(
    handoff: &HandoffChannel<H>,
    candidates: Vec<Candidate>,
    mode: ScanMode,
    list_id: Option<String>,
) -> CmdResult {
    let list_id = normalize_label(list_id);
    let batch = PendingBatch::new(candidates, Some(mode), list_id.clone());

    handoff.save_pending(&batch);
    handoff.set_last_mode(mode);
    if let Some(list_id) = &list_id {
        handoff.set_last_list_id(list_id);
        handoff.add_known_list_id(list_id);
    }

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Staged {} ({} mode)",
        plural(batch.len(), "scan", "scans"),
        mode
    )));
    result.with_pending(batch)
}

pub fn show<H: HandoffBackend>(handoff: &HandoffChannel<H>) -> CmdResult {
    let batch = handoff.load_pending();
    let mut result = CmdResult::default();
    if batch.is_empty() {
        result.add_message(CmdMessage::info("Nothing pending."));
    }
    result.with_pending(batch)
}

pub fn clear<H: HandoffBackend>(handoff: &HandoffChannel<H>) -> CmdResult {
    handoff.clear_pending();
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success("Cleared pending scans"));
    result
}

/// Drain the pending batch into the store.
///
/// The target list is the one the batch names, else `fallback_list`, else the
/// last list used, else `default_list`.
pub fn commit<S: DataStore, H: HandoffBackend>(
    service: &ScanService<S>,
    handoff: &HandoffChannel<H>,
    fallback_list: Option<&str>,
    default_list: &str,
) -> Result<CmdResult> {
    let batch = handoff.fetch_and_clear();
    let mut result = CmdResult::default();
    if batch.is_empty() {
        result.add_message(CmdMessage::info("Nothing pending."));
        return Ok(result);
    }

    let list_id = batch
        .list_id
        .clone()
        .or_else(|| normalize_label(fallback_list.map(str::to_string)))
        .or_else(|| handoff.last_list_id())
        .unwrap_or_else(|| default_list.to_string());

    let report = match service.ingest_candidates(&list_id, &batch.candidates) {
        Ok(report) => report,
        Err(e) => {
            // Put the batch back so the captures are not lost with the failed write
            handoff.save_pending(&batch);
            return Err(e);
        }
    };
    handoff.set_last_list_id(&list_id);

    result.add_message(CmdMessage::success(format!(
        "Committed {} to '{}'",
        plural(report.inserted.len(), "new item", "new items"),
        list_id
    )));
    if !report.merged.is_empty() {
        result.add_message(CmdMessage::info(format!(
            "{} matched existing items",
            plural(report.merged.len(), "scan", "scans")
        )));
    }
    if report.skipped > 0 {
        result.add_message(CmdMessage::warning(format!(
            "Skipped {} with no value",
            plural(report.skipped, "capture", "captures")
        )));
    }

    let mut affected = report.inserted;
    affected.extend(report.merged);
    Ok(result.with_affected_items(affected).with_pending(batch))
}

/// Drain the pending batch and return the text to type, if any.
pub fn insert<H: HandoffBackend>(handoff: &HandoffChannel<H>, policy: RetryPolicy) -> CmdResult {
    let batch = handoff.drain_with_retry(policy);
    match batch_text(&batch) {
        Some(text) => CmdResult::default().with_text(text).with_pending(batch),
        None => {
            let mut result = CmdResult::default();
            result.add_message(CmdMessage::info("Nothing pending."));
            result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::handoff::mem_handoff::MemHandoff;
    use crate::ingest::IngestSettings;
    use crate::store::mem_backend::MemBackend;
    use crate::store::scan_store::ScanStore;
    use crate::store::shared;
    use crate::telemetry::RecordingTelemetry;
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::Arc;

    type Service = ScanService<ScanStore<MemBackend>>;

    fn setup() -> (Service, HandoffChannel<MemHandoff>) {
        let service = ScanService::with_parts(
            shared(ScanStore::with_backend(MemBackend::new())),
            IngestSettings::default(),
            Arc::new(ManualClock::new(Utc::now())),
            Arc::new(RecordingTelemetry::new()),
        );
        (service, HandoffChannel::new(MemHandoff::new()))
    }

    fn captures(values: &[&str]) -> Vec<Candidate> {
        let t0 = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(n, v)| Candidate::at(*v, Some("QR".into()), t0 + Duration::seconds(n as i64 * 2)))
            .collect()
    }

    #[test]
    fn stage_records_mode_and_list() {
        let (_, handoff) = setup();
        stage(&handoff, captures(&["A"]), ScanMode::Multi, Some("Dock".into()));

        assert_eq!(handoff.last_mode(), Some(ScanMode::Multi));
        assert_eq!(handoff.last_list_id().as_deref(), Some("Dock"));
        assert_eq!(handoff.known_list_ids(), vec!["Dock"]);
        assert_eq!(show(&handoff).pending.unwrap().len(), 1);
    }

    #[test]
    fn commit_into_batch_list() {
        let (service, handoff) = setup();
        stage(&handoff, captures(&["A", "B"]), ScanMode::Multi, Some("Dock".into()));

        let result = commit(&service, &handoff, Some("Other"), "default-list").unwrap();
        assert_eq!(result.affected_items.len(), 2);
        assert_eq!(service.store().lock().find_items("Dock").unwrap().len(), 2);
        assert!(handoff.load_pending().is_empty());
    }

    #[test]
    fn commit_target_falls_back_in_order() {
        let (service, handoff) = setup();

        handoff.save_pending(&PendingBatch::new(captures(&["A"]), None, None));
        commit(&service, &handoff, None, "default-list").unwrap();
        assert_eq!(service.store().lock().find_items("default-list").unwrap().len(), 1);

        handoff.set_last_list_id("Last");
        handoff.save_pending(&PendingBatch::new(captures(&["B"]), None, None));
        commit(&service, &handoff, None, "default-list").unwrap();
        assert_eq!(service.store().lock().find_items("Last").unwrap().len(), 1);

        handoff.save_pending(&PendingBatch::new(captures(&["C"]), None, None));
        commit(&service, &handoff, Some("Explicit"), "default-list").unwrap();
        assert_eq!(service.store().lock().find_items("Explicit").unwrap().len(), 1);
    }

    #[test]
    fn failed_commit_keeps_the_batch() {
        let (service, handoff) = setup();
        stage(&handoff, captures(&["A"]), ScanMode::Single, Some("Dock".into()));
        service.store().lock().backend().set_simulate_write_error(true);

        assert!(commit(&service, &handoff, None, "default-list").is_err());
        assert_eq!(handoff.load_pending().values(), vec!["A"]);
    }

    #[test]
    fn commit_with_nothing_pending() {
        let (service, handoff) = setup();
        let result = commit(&service, &handoff, None, "default-list").unwrap();
        assert!(result.affected_items.is_empty());
        assert_eq!(result.messages[0].content, "Nothing pending.");
    }

    #[test]
    fn insert_returns_text_once() {
        let (_, handoff) = setup();
        stage(&handoff, captures(&["A", "B"]), ScanMode::Multi, None);

        let first = insert(&handoff, RetryPolicy::once());
        assert_eq!(first.text.as_deref(), Some("A\nB"));
        assert_eq!(insert(&handoff, RetryPolicy::once()).text, None);
    }

    #[test]
    fn clear_drops_pending() {
        let (_, handoff) = setup();
        stage(&handoff, captures(&["A"]), ScanMode::Single, None);
        clear(&handoff);
        assert!(show(&handoff).pending.unwrap().is_empty());
    }
}
