//! Repair session tests against a real database and index.

use sqlmend::config::RepairConfig;
use sqlmend::query::SqlExecutor;
use sqlmend::repair::{
    HintExtractor, HintKind, RepairDecision, RepairSession, RepairStage, FALLBACK_MESSAGE,
};
use tempfile::tempdir;

use super::school_index;

#[tokio::test]
async fn test_session_guides_correction() {
    let dir = tempdir().unwrap();
    let (config, index) = school_index(&dir).await;
    let executor = SqlExecutor::from_config(&config.database).unwrap();
    let extractor = HintExtractor::new(&index, &config.search);
    let mut session = RepairSession::from_config(&config.repair);

    let first = session
        .attempt(
            &executor,
            &extractor,
            "SELECT s.first_nam, a.city\nFROM Students s\nJOIN Addresses a ON a.address_id = s.current_address_id",
        )
        .await;
    let RepairDecision::Retry {
        attempt,
        stage,
        hints,
        ..
    } = first
    else {
        panic!("expected a retry");
    };
    assert_eq!(attempt, 1);
    assert_eq!(stage, RepairStage::SchemaCorrection);
    assert_eq!(hints[0].kind, HintKind::Column);

    let second = session
        .attempt(
            &executor,
            &extractor,
            "SELECT s.first_name, a.city\nFROM Students s\nJOIN Addresses a ON a.address_id = s.current_address_id",
        )
        .await;
    let RepairDecision::Done(success) = second else {
        panic!("expected success");
    };
    assert_eq!(success.row_count, 4);
    assert_eq!(success.columns, vec!["first_name", "city"]);
    assert!(!success.query.contains('\n'));
}

#[tokio::test]
async fn test_session_gives_up_with_fallback() {
    let dir = tempdir().unwrap();
    let (config, index) = school_index(&dir).await;
    let executor = SqlExecutor::from_config(&config.database).unwrap();
    let extractor = HintExtractor::new(&index, &config.search);
    let mut session = RepairSession::from_config(&RepairConfig { max_attempts: 3 });

    let mut stages = Vec::new();
    let message = loop {
        match session.attempt(&executor, &extractor, "SELECT * FROM Courses").await {
            RepairDecision::Retry { stage, .. } => stages.push(stage),
            RepairDecision::GiveUp { message } => break message,
            RepairDecision::Done(_) => panic!("query cannot succeed"),
        }
    };

    assert_eq!(
        stages,
        vec![
            RepairStage::SchemaCorrection,
            RepairStage::SyntaxAndLogic,
            RepairStage::Restructuring,
        ]
    );
    assert_eq!(message, FALLBACK_MESSAGE);
    assert_eq!(session.executions(), 4);
}
