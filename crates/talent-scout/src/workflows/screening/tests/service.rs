use std::sync::Arc;

use super::common::*;
use crate::config::ScreeningConfig;
use crate::workflows::screening::{
    ConversationError, ConversationStage, ExportFormat, ScreeningService, ScreeningServiceError,
};

#[tokio::test]
async fn exited_sessions_leave_the_registry() {
    let service = service(Arc::new(MemoryExporter::default()));
    let ids: Vec<_> = (0..50).map(|_| service.start().session_id).collect();
    assert_eq!(service.session_count(), 50);

    for id in &ids {
        service.send(id, "hello").await.expect("turn");
        let reply = service.send(id, "exit").await.expect("exit");
        assert_eq!(reply.stage, ConversationStage::Exited);
    }
    assert_eq!(service.session_count(), 0);

    let err = service.send(&ids[0], "hello").await.expect_err("closed");
    assert!(matches!(err, ScreeningServiceError::NotFound(id) if id == ids[0]));
    assert!(matches!(
        service.view(&ids[1]).await,
        Err(ScreeningServiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn completed_session_is_exported_then_closed() {
    let exporter = Arc::new(MemoryExporter::default());
    let service = service(exporter.clone());
    let id = service.start().session_id;
    let other = service.start().session_id;

    for input in PROFILE.iter().chain(ANSWERS.iter()) {
        service.send(&id, input).await.expect("turn");
    }
    assert_eq!(service.session_count(), 2);

    let reply = service.send(&id, "submit").await.expect("submit");
    assert_eq!(reply.stage, ConversationStage::Completed);
    assert!(reply.export.is_some());
    assert_eq!(exporter.count(), 1);
    assert_eq!(exporter.exports()[0].2, ExportFormat::Csv);
    assert_eq!(service.session_count(), 1);
    assert!(service.view(&other).await.is_ok());

    assert!(matches!(
        service.send(&id, "submit").await,
        Err(ScreeningServiceError::NotFound(_))
    ));
    assert_eq!(exporter.count(), 1);
}

#[tokio::test]
async fn failed_export_keeps_the_session_until_retry_succeeds() {
    let exporter = Arc::new(FlakyExporter::failing(1));
    let service = service(exporter.clone());
    let id = service.start().session_id;
    for input in PROFILE.iter().chain(ANSWERS.iter()) {
        service.send(&id, input).await.expect("turn");
    }

    let err = service.send(&id, "submit").await.expect_err("export fails");
    assert!(matches!(
        err,
        ScreeningServiceError::Conversation(ConversationError::ExportFailed(_))
    ));
    assert_eq!(service.session_count(), 1);

    let reply = service.send(&id, "submit").await.expect("retry");
    assert_eq!(reply.stage, ConversationStage::Completed);
    assert_eq!(exporter.inner.count(), 1);
    assert_eq!(service.session_count(), 0);
}

#[tokio::test]
async fn aborted_session_is_closed() {
    let service = ScreeningService::new(
        broken_chain(),
        Arc::new(MemoryExporter::default()),
        ScreeningConfig::default(),
        ExportFormat::Json,
    );
    let id = service.start().session_id;
    for input in &PROFILE[..7] {
        service.send(&id, input).await.expect("turn");
    }

    let err = service.send(&id, PROFILE[7]).await.expect_err("no questions");
    assert!(matches!(
        err,
        ScreeningServiceError::Conversation(ConversationError::FatalConfiguration(_))
    ));
    assert_eq!(service.session_count(), 0);
}

#[tokio::test]
async fn reset_keeps_the_session_open() {
    let service = service(Arc::new(MemoryExporter::default()));
    let id = service.start().session_id;
    service.send(&id, "hello").await.expect("turn");

    let reply = service.send(&id, "restart").await.expect("reset");
    assert_eq!(reply.stage, ConversationStage::Greeting);
    assert_eq!(service.session_count(), 1);
}
