//! # Startup Wiring
//!
//! [`initialize`] resolves where data lives, loads configuration and builds a
//! production [`ScanApi`]. Nothing here is global: every caller gets its own
//! context, and tests build theirs directly.
//!
//! ## Directory Resolution
//!
//! Data directory, first match wins:
//! 1. the explicit override (the CLI's `--data`)
//! 2. `SCANLIST_DATA`
//! 3. the OS data directory for `scanlist` (via the `directories` crate)
//!
//! Handoff directory: `SCANLIST_HANDOFF`, else `<data_dir>/handoff`. Pointing
//! two processes at the same handoff directory is what connects them.

use crate::api::ScanApi;
use crate::config::ScanlistConfig;
use crate::error::{Result, ScanError};
use crate::handoff::fs_handoff::FsHandoff;
use crate::handoff::HandoffChannel;
use crate::ingest::ScanService;
use crate::store::fs_backend::FsBackend;
use crate::store::scan_store::ScanStore;
use crate::store::shared;
use directories::ProjectDirs;
use std::path::PathBuf;

pub const DATA_ENV: &str = "SCANLIST_DATA";
pub const HANDOFF_ENV: &str = "SCANLIST_HANDOFF";
pub const HANDOFF_DIR: &str = "handoff";

pub type FsScanApi = ScanApi<ScanStore<FsBackend>, FsHandoff>;

pub struct ScanContext {
    pub api: FsScanApi,
    pub data_dir: PathBuf,
    pub handoff_dir: PathBuf,
    pub config: ScanlistConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPaths {
    pub data_dir: PathBuf,
    pub handoff_dir: PathBuf,
}

/// Resolve directories from explicit values, without reading the environment.
pub fn resolve_paths(
    data_override: Option<PathBuf>,
    env_data: Option<PathBuf>,
    env_handoff: Option<PathBuf>,
) -> Result<ScanPaths> {
    let data_dir = match data_override.or(env_data) {
        Some(dir) => dir,
        None => ProjectDirs::from("com", "scanlist", "scanlist")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| ScanError::Config("could not determine a data directory".into()))?,
    };
    let handoff_dir = env_handoff.unwrap_or_else(|| data_dir.join(HANDOFF_DIR));

    Ok(ScanPaths {
        data_dir,
        handoff_dir,
    })
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var_os(name)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

pub fn initialize(data_override: Option<PathBuf>) -> Result<ScanContext> {
    let paths = resolve_paths(data_override, env_path(DATA_ENV), env_path(HANDOFF_ENV))?;
    build(paths)
}

/// Build a context for already-resolved directories.
pub fn build(paths: ScanPaths) -> Result<ScanContext> {
    let config = ScanlistConfig::load(&paths.data_dir)?;
    tracing::debug!(
        data = %paths.data_dir.display(),
        handoff = %paths.handoff_dir.display(),
        "initializing"
    );

    let store = ScanStore::with_backend(FsBackend::new(paths.data_dir.clone()));
    let service = ScanService::new(shared(store), config.ingest_settings());
    let handoff = HandoffChannel::new(FsHandoff::new(paths.handoff_dir.clone()));
    let api = ScanApi::new(service, handoff, config.clone());

    Ok(ScanContext {
        api,
        data_dir: paths.data_dir,
        handoff_dir: paths.handoff_dir,
        config,
    })
}
