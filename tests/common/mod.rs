//! Common test utilities for Refinery integration tests
//!
//! Sample manuscripts plus builders for services backed by an in-memory
//! store, in demo mode or live mode with a scripted client.

#![allow(dead_code)]

pub mod fixtures;

pub use fixtures::{ACADEMIC, NOVEL};

use refinery::config::{AnalysisMode, Config};
use refinery::gateway::MockClient;
use refinery::{ImportRequest, Manuscript, OpenStore, Refinery, SqliteStore};
use std::sync::Arc;

/// Demo-mode service over an in-memory database.
pub fn demo_refinery() -> Arc<Refinery> {
    let store = SqliteStore::open_in_memory().expect("in-memory store");
    Arc::new(Refinery::new(Arc::new(store), &Config::default(), None))
}

/// Live-mode service whose AI calls are answered by `client`.
pub fn live_refinery(client: MockClient) -> Arc<Refinery> {
    let mut config = Config::default();
    config.analysis.mode = AnalysisMode::Live;
    let store = SqliteStore::open_in_memory().expect("in-memory store");
    Arc::new(Refinery::new(
        Arc::new(store),
        &config,
        Some(Arc::new(client)),
    ))
}

pub fn import_novel(refinery: &Refinery) -> Manuscript {
    refinery
        .import_text(ImportRequest {
            title: "The Lantern Keeper".into(),
            text: NOVEL.into(),
            author_name: Some("R. Vale".into()),
            genre: Some("literary".into()),
            ..Default::default()
        })
        .expect("import novel")
}

pub fn import_academic(refinery: &Refinery) -> Manuscript {
    refinery
        .import_text(ImportRequest {
            title: "Tidal Commons".into(),
            text: ACADEMIC.into(),
            file_type: Some("md".into()),
            ..Default::default()
        })
        .expect("import academic")
}
