//! End-to-end runs through the service: import, analyze, queue, score,
//! report and decide.

mod common;

use common::{demo_refinery, import_academic, import_novel, live_refinery};
use refinery::analysis::{AnalysisModule, ItemStatus, ModuleOptions, ModuleReport, Severity};
use refinery::gateway::MockClient;
use refinery::model::{AnalysisStatus, DocumentKind, ManuscriptStatus};
use refinery::reports::{Report, ReportRequest};
use refinery::workflow::{Outcome, Stage};
use refinery::RefineryError;

#[tokio::test]
async fn fiction_demo_pipeline() {
    let refinery = demo_refinery();
    let m = import_novel(&refinery);
    assert_eq!(m.kind, DocumentKind::Fiction);
    assert_eq!(m.chapter_count, 4);
    assert_eq!(m.chapters[1].title, "Chapter 2: The Storm");

    let results = refinery
        .run_all(&m.id, &ModuleOptions::default())
        .await
        .unwrap();
    let modules: Vec<AnalysisModule> = results.iter().map(|r| r.module).collect();
    assert_eq!(modules, AnalysisModule::plan(DocumentKind::Fiction));
    assert!(results.iter().all(|r| r.status == AnalysisStatus::Completed));

    // Repeated paragraph and telling sentences both reach the queue.
    let queue = refinery.edit_queue(&m.id, None).unwrap();
    let types: Vec<&str> = queue.items.iter().map(|i| i.finding_type.as_str()).collect();
    assert!(types.contains(&"duplication"), "{:?}", types);
    assert!(types.contains(&"show_vs_tell"), "{:?}", types);

    // Severity order, ids are positions.
    for (pos, pair) in queue.items.windows(2).enumerate() {
        assert!(pair[0].severity <= pair[1].severity);
        assert_eq!(pair[0].id as usize, pos + 1);
    }
    assert_eq!(queue.stats.total, queue.items.len());

    let score = refinery.acquisition_score(&m.id).await.unwrap();
    assert!(score.acquisition_score <= 100);
    assert_eq!(score.breakdown.len(), 5);

    let Report::Reader(reader) = refinery
        .generate_report(&m.id, &ReportRequest::Reader)
        .await
        .unwrap()
    else {
        panic!("expected a reader report");
    };
    assert_eq!(reader.title, "The Lantern Keeper");
    assert_eq!(reader.acquisition_score, score.acquisition_score);

    let stored = refinery.get_manuscript(&m.id).unwrap();
    assert_eq!(stored.status, ManuscriptStatus::Analyzed);
}

#[tokio::test]
async fn academic_demo_pipeline() {
    let refinery = demo_refinery();
    let m = import_academic(&refinery);
    assert_eq!(m.kind, DocumentKind::Academic);
    assert_eq!(m.author_name.as_deref(), Some("J. Okafor"));
    assert_eq!(m.chapter_count, 4);

    let options = ModuleOptions {
        discipline: "marine policy".into(),
        ..ModuleOptions::default()
    };
    let results = refinery.run_all(&m.id, &options).await.unwrap();
    assert_eq!(results[1].module, AnalysisModule::ArgumentCoherence);

    let queue = refinery.edit_queue(&m.id, None).unwrap();
    let types: Vec<&str> = queue.items.iter().map(|i| i.finding_type.as_str()).collect();
    assert!(types.contains(&"citation_format"), "{:?}", types);
    assert!(types.contains(&"over_hedged"), "{:?}", types);
    assert!(types.contains(&"under_hedged"), "{:?}", types);

    let report = refinery
        .generate_report(
            &m.id,
            &ReportRequest::from_labels("committee", Some("chapter_review"), None, None).unwrap(),
        )
        .await
        .unwrap();
    assert!(matches!(report, Report::Committee(_)));
}

#[tokio::test]
async fn live_module_uses_model_reply() {
    let client = MockClient::new().with_response(
        "Prose Refinery",
        r#"```json
{"prose_score": 64,
 "show_vs_tell": {"tell_passages_found": 1, "items": [
   {"location": "Chapter 1", "original": "She felt the cold", "suggestion": "Show her shiver", "severity": "high"}]},
 "summary": "Tight but tells emotion."}
```"#,
    );
    let refinery = live_refinery(client);
    let m = import_novel(&refinery);

    let row = refinery
        .run_module(&m.id, AnalysisModule::ProseRefinery, &ModuleOptions::default())
        .await
        .unwrap();
    assert_eq!(row.status, AnalysisStatus::Completed);
    let Some(ModuleReport::ProseRefinery(prose)) = &row.report else {
        panic!("expected a prose report");
    };
    assert_eq!(prose.prose_score, 64.0);
    assert_eq!(prose.show_vs_tell.items.len(), 1);
    assert_eq!(prose.show_vs_tell.items[0].severity, Some(Severity::High));
    // Local statistics ride along with the model's report.
    assert!(prose.local_stats.is_some());

    refinery
        .run_module(&m.id, AnalysisModule::RevisionCenter, &ModuleOptions::default())
        .await
        .unwrap();
    let queue = refinery.edit_queue(&m.id, Some(ItemStatus::Pending)).unwrap();
    assert_eq!(queue.items[0].finding_type, "show_vs_tell");
    assert_eq!(queue.items[0].chapter_ref, "Chapter 1");
}

#[tokio::test]
async fn live_without_client_fails_cleanly() {
    let mut config = refinery::Config::default();
    config.analysis.mode = refinery::AnalysisMode::Live;
    let store = <refinery::SqliteStore as refinery::OpenStore>::open_in_memory().unwrap();
    let refinery = refinery::Refinery::new(std::sync::Arc::new(store), &config, None);
    let m = import_novel(&refinery);

    let err = refinery
        .run_module(&m.id, AnalysisModule::VoiceIsolation, &ModuleOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, RefineryError::AnalysisFailed { .. }));
    assert!(err.to_string().contains("not configured"));

    let rows = refinery.list_results(&m.id).unwrap();
    assert_eq!(rows[0].status, AnalysisStatus::Failed);
}

#[tokio::test]
async fn decision_workflow_to_outcome() {
    let refinery = demo_refinery();
    let m = import_novel(&refinery);

    refinery
        .advance_decision(&m.id, Some("Atmospheric, slow middle".into()), None)
        .unwrap();
    refinery
        .advance_decision(&m.id, Some("Recommend with edits".into()), None)
        .unwrap();
    let decision = refinery
        .advance_decision(&m.id, Some("Approved".into()), Some(Outcome::Acquire))
        .unwrap();
    assert_eq!(decision.stage, Stage::DirectorDecision);
    assert_eq!(decision.outcome, Outcome::Acquire);
    assert_eq!(
        refinery.decision(&m.id).unwrap().editor_notes.as_deref(),
        Some("Recommend with edits")
    );
}

#[tokio::test]
async fn deleting_manuscript_removes_everything() {
    let refinery = demo_refinery();
    let m = import_novel(&refinery);
    let row = refinery
        .run_module(&m.id, AnalysisModule::PacingArchitect, &ModuleOptions::default())
        .await
        .unwrap();

    refinery.delete_manuscript(&m.id).unwrap();
    assert!(refinery.get_result(&row.id).unwrap_err().is_not_found());
    assert!(refinery.list_manuscripts().unwrap().is_empty());
    assert!(refinery.delete_manuscript(&m.id).unwrap_err().is_not_found());
}
