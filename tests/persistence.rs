//! On-disk database behavior: file import, reopen, config-driven setup.

mod common;

use common::NOVEL;
use refinery::analysis::{AnalysisModule, ItemStatus, ModuleOptions};
use refinery::config::Config;
use refinery::model::DocumentKind;
use refinery::Refinery;
use tempfile::tempdir;

fn config_for(db: &std::path::Path) -> Config {
    Config::from_toml(&format!(
        "database = \"{}\"\n\n[analysis]\nmode = \"demo\"\n",
        db.display()
    ))
    .unwrap()
}

#[tokio::test]
async fn results_survive_reopen() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("nested").join("refinery.db");
    let source = dir.path().join("lantern-keeper.txt");
    std::fs::write(&source, NOVEL).unwrap();

    let config = config_for(&db);
    let manuscript_id = {
        let refinery = Refinery::from_config(&config).unwrap();
        let m = refinery.import_file(&source, None, None).unwrap();
        assert_eq!(m.title, "lantern-keeper");
        assert_eq!(m.file_type, "txt");

        refinery
            .run_all(&m.id, &ModuleOptions::default())
            .await
            .unwrap();
        refinery
            .set_item_status(&m.id, 1, ItemStatus::Rejected)
            .unwrap();
        m.id
    };
    assert!(db.exists());

    let reopened = Refinery::from_config(&config).unwrap();
    let m = reopened.get_manuscript(&manuscript_id).unwrap();
    assert_eq!(m.chapters.len(), 4);
    assert!(m.last_analyzed_at.is_some());

    let results = reopened.list_results(&manuscript_id).unwrap();
    assert_eq!(results.len(), 6);
    assert_eq!(results[5].module, AnalysisModule::RevisionCenter);
    assert!(results.iter().all(|r| r.report.is_some()));

    let rejected = reopened
        .edit_queue(&manuscript_id, Some(ItemStatus::Rejected))
        .unwrap();
    assert_eq!(rejected.items.len(), 1);
    assert_eq!(rejected.items[0].id, 1);
}

#[test]
fn markdown_file_uses_frontmatter() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("draft.md");
    std::fs::write(
        &source,
        "---\ntitle: Tidal Commons\nkind: academic\n---\n# Chapter 1: Intro\n\nText (Ostrom, 1990).\n\n# Chapter 2: Methods\n\nMore text.\n",
    )
    .unwrap();

    let refinery = Refinery::from_config(&config_for(&dir.path().join("r.db"))).unwrap();
    let m = refinery.import_file(&source, None, None).unwrap();
    assert_eq!(m.title, "Tidal Commons");
    assert_eq!(m.kind, DocumentKind::Academic);
    assert_eq!(m.file_type, "md");
    assert_eq!(m.chapter_count, 2);

    // An explicit kind wins over frontmatter.
    let m = refinery
        .import_file(&source, Some("Override".into()), Some(DocumentKind::Fiction))
        .unwrap();
    assert_eq!(m.title, "Override");
    assert_eq!(m.kind, DocumentKind::Fiction);
}

#[test]
fn unsupported_and_missing_files() {
    let dir = tempdir().unwrap();
    let refinery = Refinery::from_config(&config_for(&dir.path().join("r.db"))).unwrap();

    let pdf = dir.path().join("draft.pdf");
    std::fs::write(&pdf, "%PDF-1.4").unwrap();
    assert!(refinery.import_file(&pdf, None, None).unwrap_err().is_validation());

    let missing = dir.path().join("nowhere.txt");
    let err = refinery.import_file(&missing, None, None).unwrap_err();
    assert!(!err.is_validation());
    assert!(!err.is_not_found());
}
