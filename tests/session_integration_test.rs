//! 会话集成测试：目录槽位 + Mock 补全 + 内存库存，走完一次完整的做菜流程

use std::sync::Arc;
use std::time::Duration;

use nourish::assistant::{CommitOutcome, IntentMailbox, SendOutcome};
use nourish::config::AppConfig;
use nourish::core::{SessionBuilder, SessionEvent, SessionPhase};
use nourish::inventory::MemoryInventory;
use nourish::llm::MockLlmClient;
use nourish::memory::{FileSlotStore, SlotStore, ARCHIVE_SLOT, INTENT_SLOT, TIMELINE_SLOT};

fn fast_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.session.continuation_delay_ms = 5;
    config
}

#[tokio::test]
async fn test_cooking_flow_end_to_end() {
    let dir = tempfile::TempDir::new().unwrap();
    let slots: Arc<dyn SlotStore> = Arc::new(FileSlotStore::new(dir.path()));
    IntentMailbox::new(slots.clone())
        .post("Banana bread")
        .await
        .unwrap();

    let llm = Arc::new(MockLlmClient::with_replies([
        "Lovely choice.\n+++INGREDIENTS: Banana, Flour, Butter, Sugar +++",
        "Step 1: mash the bananas.",
    ]));
    let inventory = Arc::new(MemoryInventory::new());

    let (controller, auto_start) = SessionBuilder::new(fast_config())
        .with_slots(slots.clone())
        .with_llm(llm.clone())
        .with_inventory(inventory.clone())
        .build()
        .await;
    let mut events = controller.subscribe();

    let outcome = auto_start.expect("intent was posted").await.unwrap();
    let SendOutcome::Replied { message_id } = outcome else {
        panic!("auto-start should reply");
    };
    assert!(slots.get(INTENT_SLOT).await.unwrap().is_none());

    let selection = controller.open_selection(&message_id).await.unwrap();
    assert_eq!(selection.selected().len(), 4);
    controller.toggle_selection("Sugar").await;

    let CommitOutcome::Committed { count, continuation } =
        controller.commit_selection().await.unwrap()
    else {
        panic!("selection should commit");
    };
    assert_eq!(count, 3);
    assert!(matches!(continuation.await.unwrap(), SendOutcome::Replied { .. }));

    let names: Vec<String> = inventory.records().into_iter().map(|r| r.name).collect();
    assert_eq!(names, vec!["Banana", "Flour", "Butter"]);
    assert_eq!(
        llm.prompts(),
        vec![
            "I want to cook Banana bread. Guide me and list the ingredients.".to_string(),
            "I have added 3 items to my pantry. Please start the step-by-step cooking guide now."
                .to_string(),
        ]
    );

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.phase, SessionPhase::Idle);
    assert!(snapshot.selection.is_none());
    assert_eq!(snapshot.timeline.len(), 5);
    assert!(snapshot.timeline.get(&message_id).unwrap().committed);

    let mut saw_commit = false;
    while let Ok(event) = events.try_recv() {
        if event == (SessionEvent::MessageCommitted { message_id: message_id.clone() }) {
            saw_commit = true;
        }
    }
    assert!(saw_commit);

    // 重置后归档落盘
    assert!(controller.reset().await.unwrap());
    controller.shutdown().await;
    assert!(slots.get(ARCHIVE_SLOT).await.unwrap().is_some());
    assert!(slots.get(TIMELINE_SLOT).await.unwrap().is_some());

    // 同一目录重新构建：归档仍在，时间线是新的，意图不会再触发
    let (restarted, auto_start) = SessionBuilder::new(fast_config())
        .with_slots(slots)
        .with_llm(llm.clone())
        .with_inventory(inventory)
        .build()
        .await;
    assert!(auto_start.is_none());
    let summaries = restarted.archive_summaries().await;
    assert_eq!(summaries.len(), 1);
    assert_eq!(
        summaries[0].title,
        "I want to cook Banana bread. Guide me and list the ingredients."
    );
    assert_eq!(restarted.timeline().await.len(), 1);

    restarted.restore(0).await.unwrap();
    assert_eq!(restarted.timeline().await.len(), 5);
    assert_eq!(llm.prompts().len(), 2);
    restarted.shutdown().await;
}

#[tokio::test]
async fn test_upstream_timeout_appends_error_message() {
    let (llm, _gate) = MockLlmClient::gated();
    let mut config = fast_config();
    config.session.request_timeout_secs = 0;

    let (controller, _) = SessionBuilder::new(config)
        .with_llm(Arc::new(llm))
        .build()
        .await;

    let outcome = tokio::time::timeout(Duration::from_secs(5), controller.send("hello"))
        .await
        .unwrap();
    assert!(matches!(outcome, SendOutcome::Failed { .. }));

    let timeline = controller.timeline().await;
    assert_eq!(timeline.len(), 3);
    assert!(timeline.last().unwrap().is_error);
    assert_eq!(controller.phase(), SessionPhase::Idle);
}
