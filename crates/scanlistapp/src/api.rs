//! # API Facade
//!
//! [`ScanApi`] is the single entry point for every scanlist operation,
//! whatever the UI. It dispatches to `commands/*.rs`, normalizes inputs
//! (item selectors to ids, missing options to configured defaults) and returns
//! `Result<CmdResult>`. It does no terminal I/O.
//!
//! ## What It Owns
//!
//! - the [`ScanService`], which in turn holds the [`SharedStore`]
//! - the [`HandoffChannel`] to the other side of the capture workflow
//! - the resolved [`ScanlistConfig`]
//!
//! Store mutations take the shared lock for the duration of one command, so
//! facade edits and ingestion writes never interleave.
//!
//! ## Generic Over Storage
//!
//! `ScanApi<S: DataStore, H: HandoffBackend>`:
//! - Production: `ScanApi<ScanStore<FsBackend>, FsHandoff>`
//! - Testing: `ScanApi<ScanStore<MemBackend>, MemHandoff>`

use crate::commands::config::ConfigAction;
use crate::commands::helpers::ItemSelector;
use crate::commands::{self, CmdMessage, CmdResult};
use crate::config::ScanlistConfig;
use crate::error::Result;
use crate::export::CsvOptions;
use crate::handoff::backend::HandoffBackend;
use crate::handoff::{HandoffChannel, RetryPolicy};
use crate::ingest::ScanService;
use crate::model::{Candidate, ScanItem, ScanMode};
use crate::route;
use crate::store::{DataStore, SharedStore};
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub struct ScanApi<S: DataStore, H: HandoffBackend> {
    service: ScanService<S>,
    handoff: HandoffChannel<H>,
    config: ScanlistConfig,
}

impl<S: DataStore, H: HandoffBackend> ScanApi<S, H> {
    pub fn new(service: ScanService<S>, handoff: HandoffChannel<H>, config: ScanlistConfig) -> Self {
        Self {
            service,
            handoff,
            config,
        }
    }

    pub fn service(&self) -> &ScanService<S> {
        &self.service
    }

    pub fn store(&self) -> &SharedStore<S> {
        self.service.store()
    }

    pub fn handoff(&self) -> &HandoffChannel<H> {
        &self.handoff
    }

    pub fn settings(&self) -> &ScanlistConfig {
        &self.config
    }

    pub fn data_location(&self) -> PathBuf {
        self.store().lock().location()
    }

    // --- Lists ---

    pub fn create_list(&self, name: &str) -> Result<CmdResult> {
        commands::lists::create(&mut *self.store().lock(), &self.handoff, name)
    }

    pub fn list_lists(&self) -> Result<CmdResult> {
        commands::lists::list(&*self.store().lock())
    }

    pub fn rename_list(&self, name: &str, new_name: &str) -> Result<CmdResult> {
        commands::lists::rename(&mut *self.store().lock(), &self.handoff, name, new_name)
    }

    pub fn delete_list(&self, name: &str, confirmation: &str) -> Result<CmdResult> {
        commands::lists::delete(&mut *self.store().lock(), &self.handoff, name, confirmation)
    }

    pub fn set_list_meta(
        &self,
        name: &str,
        item_name: Option<String>,
        supplier_name: Option<String>,
    ) -> Result<CmdResult> {
        commands::lists::set_meta(&mut *self.store().lock(), name, item_name, supplier_name)
    }

    // --- Items ---

    pub fn add_scan(
        &self,
        list_id: &str,
        code_raw: &str,
        code_type: &str,
        label: Option<String>,
    ) -> Result<CmdResult> {
        commands::items::add(&self.service, list_id, code_raw, code_type, label)
    }

    pub fn items(&self, list_id: &str) -> Result<CmdResult> {
        commands::items::list(&*self.store().lock(), list_id)
    }

    pub fn update_item_label(&self, id: &Uuid, label: Option<String>) -> Result<CmdResult> {
        let at = self.service.now();
        commands::items::update_label(&mut *self.store().lock(), id, label, at)
    }

    pub fn delete_item(&self, id: &Uuid) -> Result<CmdResult> {
        commands::items::delete(&mut *self.store().lock(), id)
    }

    /// Resolve `selector` ("3" or a full id) within `list_id` to an item id.
    pub fn resolve_item(&self, list_id: &str, selector: &str) -> Result<Uuid> {
        let selector: ItemSelector = selector.parse()?;
        commands::items::resolve(&*self.store().lock(), list_id, selector)
    }

    // --- Export ---

    pub fn export_list(&self, list_id: &str) -> Result<Vec<ScanItem>> {
        Ok(commands::export::items(&*self.store().lock(), list_id)?.listed_items)
    }

    /// CSV text of the list. `None` uses the configured delimiter with a header.
    pub fn export_csv(&self, list_id: &str, options: Option<CsvOptions>) -> Result<CmdResult> {
        let options = self.csv_options(options)?;
        commands::export::csv(&*self.store().lock(), list_id, &options)
    }

    pub fn export_to_dir(
        &self,
        list_id: &str,
        options: Option<CsvOptions>,
        dir: &Path,
    ) -> Result<CmdResult> {
        let options = self.csv_options(options)?;
        commands::export::to_dir(&*self.store().lock(), list_id, &options, dir)
    }

    fn csv_options(&self, options: Option<CsvOptions>) -> Result<CsvOptions> {
        match options {
            Some(options) => Ok(options),
            None => self.config.csv_options(),
        }
    }

    // --- Capture workflow ---

    pub fn stage_capture(
        &self,
        candidates: Vec<Candidate>,
        mode: ScanMode,
        list_id: Option<String>,
    ) -> CmdResult {
        commands::pending::stage(&self.handoff, candidates, mode, list_id)
    }

    pub fn pending(&self) -> CmdResult {
        commands::pending::show(&self.handoff)
    }

    pub fn clear_pending(&self) -> CmdResult {
        commands::pending::clear(&self.handoff)
    }

    pub fn commit_pending(&self, fallback_list: Option<&str>) -> Result<CmdResult> {
        commands::pending::commit(
            &self.service,
            &self.handoff,
            fallback_list,
            self.config.default_list(),
        )
    }

    /// Text to type for the pending batch. `None` uses the configured retry policy.
    pub fn insert_pending(&self, policy: Option<RetryPolicy>) -> CmdResult {
        let policy = policy.unwrap_or_else(|| self.config.retry_policy());
        commands::pending::insert(&self.handoff, policy)
    }

    // --- Activation addresses ---

    pub fn scan_address(&self, mode: ScanMode) -> String {
        route::scan_address(mode)
    }

    pub fn parse_activation(&self, address: &str) -> CmdResult {
        match route::parse(address, self.handoff.last_mode()) {
            Some(activation) => CmdResult::default().with_activation(activation),
            None => {
                let mut result = CmdResult::default();
                result.add_message(CmdMessage::warning(format!(
                    "Not a scan address: {}",
                    address.trim()
                )));
                result
            }
        }
    }

    // --- Known lists ---

    pub fn known_lists(&self) -> CmdResult {
        commands::known::list(&self.handoff)
    }

    pub fn add_known_list(&self, name: &str) -> Result<CmdResult> {
        commands::known::add(&self.handoff, name)
    }

    pub fn remove_known_list(&self, name: &str) -> CmdResult {
        commands::known::remove(&self.handoff, name)
    }

    // --- Config ---

    pub fn config(&self, action: ConfigAction) -> CmdResult {
        commands::config::run(&self.config, action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::ScanError;
    use crate::handoff::mem_handoff::MemHandoff;
    use crate::store::mem_backend::MemBackend;
    use crate::store::scan_store::ScanStore;
    use crate::store::shared;
    use crate::telemetry::RecordingTelemetry;
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::Arc;

    fn make_api() -> (ScanApi<ScanStore<MemBackend>, MemHandoff>, Arc<ManualClock>) {
        let config = ScanlistConfig::default();
        let clock = Arc::new(ManualClock::new(Utc.timestamp_opt(1_700_000_000, 0).unwrap()));
        let service = ScanService::with_parts(
            shared(ScanStore::with_backend(MemBackend::new())),
            config.ingest_settings(),
            clock.clone(),
            Arc::new(RecordingTelemetry::new()),
        );
        (
            ScanApi::new(service, HandoffChannel::new(MemHandoff::new()), config),
            clock,
        )
    }

    #[test]
    fn export_rejects_a_quote_delimiter() {
        let (api, _) = make_api();
        api.add_scan("L1", "1", "QR", Some("a\"b".into())).unwrap();
        let options = CsvOptions {
            delimiter: '"',
            include_header: true,
        };

        assert!(matches!(
            api.export_csv("L1", Some(options)),
            Err(ScanError::Validation { field: "delimiter", .. })
        ));
        let dir = tempfile::tempdir().unwrap();
        assert!(api.export_to_dir("L1", Some(options), dir.path()).is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn create_list_then_find_it() {
        let (api, _) = make_api();
        api.create_list("  Warehouse A  ").unwrap();
        let lists = api.list_lists().unwrap().lists;
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].name, "Warehouse A");
        assert_eq!(api.known_lists().names, vec!["Warehouse A"]);
    }

    #[test]
    fn scan_label_and_delete_by_position() {
        let (api, clock) = make_api();
        api.add_scan("L1", "111", "QR", None).unwrap();
        clock.advance(Duration::seconds(3));
        api.add_scan("L1", "222", "QR", None).unwrap();

        let id = api.resolve_item("L1", "1").unwrap();
        let labelled = api.update_item_label(&id, Some("top".into())).unwrap();
        assert_eq!(labelled.affected_items[0].code_raw, "222");

        api.delete_item(&id).unwrap();
        let remaining = api.export_list("L1").unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].code_raw, "111");
    }

    #[test]
    fn export_uses_configured_delimiter_by_default() {
        let (api, _) = make_api();
        api.add_scan("L1", "1", "QR", Some("a;b".into())).unwrap();
        let text = api.export_csv("L1", None).unwrap().text.unwrap();
        assert!(text.contains(",a;b,"));

        let text = api
            .export_csv("L1", Some(CsvOptions::new(';').unwrap()))
            .unwrap()
            .text
            .unwrap();
        assert!(text.contains(";\"a;b\";"));
    }

    #[test]
    fn capture_then_insert() {
        let (api, _) = make_api();
        api.stage_capture(
            vec![Candidate::new("A", None), Candidate::new("B", None)],
            ScanMode::Multi,
            None,
        );
        let inserted = api.insert_pending(Some(RetryPolicy::once()));
        assert_eq!(inserted.text.as_deref(), Some("A\nB"));
        assert!(api.insert_pending(Some(RetryPolicy::once())).text.is_none());
    }

    #[test]
    fn capture_then_commit_to_default_list() {
        let (api, _) = make_api();
        api.stage_capture(vec![Candidate::new("A", None)], ScanMode::Single, None);
        api.commit_pending(None).unwrap();
        assert_eq!(api.items("default-list").unwrap().listed_items.len(), 1);
    }

    #[test]
    fn activation_uses_last_mode() {
        let (api, _) = make_api();
        api.stage_capture(vec![], ScanMode::Multi, None);

        let parsed = api.parse_activation("barcodekb://scan");
        assert_eq!(parsed.activation.unwrap().mode, ScanMode::Multi);

        let rejected = api.parse_activation("https://example.com");
        assert!(rejected.activation.is_none());
        assert_eq!(rejected.messages.len(), 1);
        assert_eq!(api.scan_address(ScanMode::Single), "barcodekb://scan?mode=single");
    }
}
