//! 会话控制器：时间线、选择、归档与两个派发器的编排
//!
//! SessionController 是 Arc 共享状态上的廉价句柄，可在任务间克隆。
//! 每次状态变更后显式投递一次保存（写入任务异步落盘），并广播 SessionEvent 供界面订阅。
//! 所有 RwLock 都只在同步片段内持有，从不跨越上游调用的 await。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;

use crate::assistant::{
    CommitDispatcher, CommitOutcome, CommitTarget, RequestDispatcher, Selection,
    SelectionWorkflow, SendOutcome, StartCooking, TimelineSink, DEFAULT_CONTINUATION_DELAY,
    SUGGESTIONS,
};
use crate::config::AppConfig;
use crate::core::{SessionError, SessionEvent, SessionPhase, SessionSnapshot, SessionSupervisor};
use crate::inventory::{InventorySink, SinkError};
use crate::llm::LlmClient;
use crate::memory::{
    spawn_writer, ArchiveStore, ArchiveSummary, Message, PersistHandle, SlotStore, Timeline,
    TimelinePersistence, DEFAULT_ARCHIVE_CAPACITY, DEFAULT_TTL,
};

const EVENT_CAPACITY: usize = 64;

/// 控制器运行参数
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub ttl: Duration,
    pub archive_capacity: usize,
    pub continuation_delay: Duration,
    pub request_timeout: Duration,
    pub shutdown_timeout: Duration,
    pub owner_ref: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            archive_capacity: DEFAULT_ARCHIVE_CAPACITY,
            continuation_delay: DEFAULT_CONTINUATION_DELAY,
            request_timeout: Duration::from_secs(60),
            shutdown_timeout: Duration::from_secs(5),
            owner_ref: "local-user".to_string(),
        }
    }
}

impl From<&AppConfig> for SessionConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            ttl: cfg.session.ttl(),
            archive_capacity: cfg.session.archive_capacity,
            continuation_delay: cfg.session.continuation_delay(),
            request_timeout: cfg.session.request_timeout(),
            shutdown_timeout: cfg.session.shutdown_timeout(),
            owner_ref: cfg.app.owner_ref.clone(),
        }
    }
}

/// 控制器的外部协作者
#[derive(Clone)]
pub struct SessionDeps {
    pub slots: Arc<dyn SlotStore>,
    pub llm: Arc<dyn LlmClient>,
    pub inventory: Arc<dyn InventorySink>,
}

struct Shared {
    timeline: RwLock<Timeline>,
    selection: RwLock<SelectionWorkflow>,
    archive: RwLock<ArchiveStore>,
    dispatcher: RequestDispatcher,
    committer: CommitDispatcher,
    persist: PersistHandle,
    supervisor: SessionSupervisor,
    events: broadcast::Sender<SessionEvent>,
    auto_started: AtomicBool,
    config: SessionConfig,
}

impl Shared {
    fn emit(&self, event: SessionEvent) {
        // 没有订阅者时 send 返回 Err，属正常情况
        let _ = self.events.send(event);
    }

    async fn close_selection(&self) -> Option<Selection> {
        let closed = self.selection.write().await.close();
        if closed.is_some() {
            self.emit(SessionEvent::SelectionClosed);
        }
        closed
    }
}

#[async_trait]
impl TimelineSink for Shared {
    async fn append(&self, message: Message) {
        let event = SessionEvent::MessageAppended {
            message_id: message.id.clone(),
            role: message.role,
        };
        {
            let mut timeline = self.timeline.write().await;
            timeline.push(message);
            self.persist.save_timeline(&timeline);
        }
        self.emit(event);
    }
}

/// 会话控制器
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<Shared>,
}

impl SessionController {
    /// 启动会话：恢复未过期的时间线（否则从问候语开始）、恢复归档、启动写入任务
    pub async fn start(config: SessionConfig, deps: SessionDeps) -> Self {
        let persistence = TimelinePersistence::new(deps.slots.clone(), config.ttl);
        let timeline = match persistence.load().await {
            Some(timeline) => {
                tracing::info!("Restored persisted timeline ({} messages)", timeline.len());
                timeline
            }
            None => Timeline::new(),
        };

        let (persist, _writer) = spawn_writer(persistence, deps.slots.clone());
        let archive =
            ArchiveStore::load(deps.slots.as_ref(), config.archive_capacity, persist.clone()).await;
        persist.save_timeline(&timeline);

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let shared = Shared {
            timeline: RwLock::new(timeline),
            selection: RwLock::new(SelectionWorkflow::new()),
            archive: RwLock::new(archive),
            dispatcher: RequestDispatcher::new(deps.llm, config.request_timeout),
            committer: CommitDispatcher::new(
                deps.inventory,
                config.owner_ref.clone(),
                config.continuation_delay,
            ),
            persist,
            supervisor: SessionSupervisor::new(),
            events,
            auto_started: AtomicBool::new(false),
            config,
        };
        tracing::debug!(
            "Session started (archive: {} entries)",
            shared.archive.read().await.len()
        );
        Self {
            inner: Arc::new(shared),
        }
    }

    /// 发送用户输入；空白输入与在途时的重叠调用直接忽略
    pub async fn send(&self, text: &str) -> SendOutcome {
        if self.inner.supervisor.is_shutdown() {
            return SendOutcome::Cancelled;
        }
        let cancel = self.inner.supervisor.child_token();
        self.inner
            .dispatcher
            .send(text, self.inner.as_ref(), &cancel)
            .await
    }

    /// 启动意图：每个控制器实例至多触发一次，返回后台发送任务
    pub fn auto_start(&self, intent: StartCooking) -> Option<JoinHandle<SendOutcome>> {
        if self
            .inner
            .auto_started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!("Auto-start already fired, ignoring intent for {}", intent.dish());
            return None;
        }

        tracing::info!("Auto-starting cooking session for {}", intent.dish());
        self.inner.emit(SessionEvent::AutoStarted {
            dish: intent.dish().to_string(),
        });
        let prompt = intent.into_prompt();
        let controller = self.clone();
        Some(
            self.inner
                .supervisor
                .spawn(async move { controller.send(&prompt).await }),
        )
    }

    /// 重置会话：有历史则先归档，再换成只含问候语的新时间线；返回是否归档
    pub async fn reset(&self) -> Result<bool, SessionError> {
        // 整个重置期间占住单飞标记，重置中途到达的 send 被拒绝
        let Some(_idle) = self.inner.dispatcher.try_acquire() else {
            return Err(SessionError::Busy);
        };

        let archived = {
            let mut timeline = self.inner.timeline.write().await;
            let archived = timeline.has_history();
            if archived {
                self.inner.archive.write().await.archive(&timeline);
            }
            *timeline = Timeline::new();
            self.inner.persist.save_timeline(&timeline);
            archived
        };
        self.inner.close_selection().await;

        tracing::info!("Session reset (archived: {})", archived);
        self.inner.emit(SessionEvent::SessionReset { archived });
        Ok(archived)
    }

    /// 从归档恢复；任何阶段都可调用，归档条目本身保留
    pub async fn restore(&self, index: usize) -> Result<(), SessionError> {
        let restored = self
            .inner
            .archive
            .read()
            .await
            .restore(index)
            .ok_or(SessionError::ArchiveEntryNotFound(index))?;

        {
            let mut timeline = self.inner.timeline.write().await;
            *timeline = restored;
            self.inner.persist.save_timeline(&timeline);
        }
        self.inner.close_selection().await;

        tracing::info!("Restored archived session {}", index);
        self.inner.emit(SessionEvent::SessionRestored { index });
        Ok(())
    }

    pub async fn clear_archive(&self) {
        self.inner.archive.write().await.clear();
        tracing::info!("Archive cleared");
        self.inner.emit(SessionEvent::ArchiveCleared);
    }

    pub async fn archive_summaries(&self) -> Vec<ArchiveSummary> {
        self.inner.archive.read().await.summaries()
    }

    /// 为带食材清单的助手消息打开选择（默认全选）
    pub async fn open_selection(&self, message_id: &str) -> Result<Selection, SessionError> {
        let items = self
            .inner
            .timeline
            .read()
            .await
            .get(message_id)
            .and_then(|m| m.ingredients.clone())
            .filter(|items| !items.is_empty())
            .ok_or_else(|| SessionError::NoIngredients(message_id.to_string()))?;

        let selection = {
            let mut workflow = self.inner.selection.write().await;
            workflow.open(message_id, items);
            workflow.current().cloned().ok_or(SessionError::NoSelection)?
        };
        self.inner.emit(SessionEvent::SelectionOpened {
            message_id: message_id.to_string(),
        });
        Ok(selection)
    }

    /// 翻转勾选；没有打开的选择或食材不在清单中时返回 None
    pub async fn toggle_selection(&self, item: &str) -> Option<bool> {
        self.inner.selection.write().await.toggle(item)
    }

    /// 关闭选择，不提交
    pub async fn close_selection(&self) -> Option<Selection> {
        self.inner.close_selection().await
    }

    pub async fn selection(&self) -> Option<Selection> {
        self.inner.selection.read().await.current().cloned()
    }

    /// 把 items 入库并标记消息；成功后安排一次续接请求
    pub async fn commit(
        &self,
        message_id: &str,
        items: &[String],
    ) -> Result<CommitOutcome, SessionError> {
        Ok(self.inner.committer.commit(message_id, items, self).await?)
    }

    /// 提交当前打开的选择
    pub async fn commit_selection(&self) -> Result<CommitOutcome, SessionError> {
        let selection = self.selection().await.ok_or(SessionError::NoSelection)?;
        self.commit(selection.message_id(), &selection.selected())
            .await
    }

    pub fn phase(&self) -> SessionPhase {
        if self.inner.dispatcher.is_busy() {
            SessionPhase::Sending
        } else {
            SessionPhase::Idle
        }
    }

    pub async fn timeline(&self) -> Timeline {
        self.inner.timeline.read().await.clone()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase(),
            timeline: self.timeline().await,
            selection: self.selection().await,
            archived_sessions: self.inner.archive.read().await.len(),
        }
    }

    /// 新会话（只有问候语）时展示的起始提示词
    pub async fn suggestions(&self) -> &'static [&'static str] {
        if self.inner.timeline.read().await.has_history() {
            &[]
        } else {
            &SUGGESTIONS
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    /// 等待已投递的持久化写入全部完成
    pub async fn flush(&self) {
        self.inner.persist.flush().await;
    }

    /// 拆除：取消在途请求与未触发的续接，等待后台任务后落盘
    pub async fn shutdown(&self) {
        tracing::info!("Shutting down session");
        self.inner
            .supervisor
            .shutdown(self.inner.config.shutdown_timeout)
            .await;
        self.flush().await;
    }
}

#[async_trait]
impl CommitTarget for SessionController {
    async fn mark_committed(&self, message_id: &str) -> bool {
        let marked = {
            let mut timeline = self.inner.timeline.write().await;
            let marked = timeline.mark_committed(message_id);
            if marked {
                self.inner.persist.save_timeline(&timeline);
            }
            marked
        };
        if marked {
            self.inner.emit(SessionEvent::MessageCommitted {
                message_id: message_id.to_string(),
            });
        }
        marked
    }

    async fn close_selection(&self) {
        self.inner.close_selection().await;
    }

    fn schedule_continuation(&self, prompt: String, delay: Duration) -> JoinHandle<SendOutcome> {
        let controller = self.clone();
        let cancel = self.inner.supervisor.child_token();
        self.inner.supervisor.spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => SendOutcome::Cancelled,
                _ = tokio::time::sleep(delay) => {
                    controller
                        .inner
                        .dispatcher
                        .send(&prompt, controller.inner.as_ref(), &cancel)
                        .await
                }
            }
        })
    }

    fn commit_failed(&self, message_id: &str, error: &SinkError) {
        self.inner.emit(SessionEvent::CommitFailed {
            message_id: message_id.to_string(),
            reason: error.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::IntentMailbox;
    use crate::inventory::MemoryInventory;
    use crate::llm::{MockGate, MockLlmClient};
    use crate::memory::{MemorySlotStore, Role, TIMELINE_SLOT};

    struct Harness {
        controller: SessionController,
        llm: Arc<MockLlmClient>,
        inventory: Arc<MemoryInventory>,
        slots: Arc<MemorySlotStore>,
    }

    fn test_config() -> SessionConfig {
        SessionConfig {
            continuation_delay: Duration::from_millis(10),
            request_timeout: Duration::from_secs(5),
            ..SessionConfig::default()
        }
    }

    async fn harness_with(llm: MockLlmClient, slots: Arc<MemorySlotStore>) -> Harness {
        let llm = Arc::new(llm);
        let inventory = Arc::new(MemoryInventory::new());
        let controller = SessionController::start(
            test_config(),
            SessionDeps {
                slots: slots.clone(),
                llm: llm.clone(),
                inventory: inventory.clone(),
            },
        )
        .await;
        Harness {
            controller,
            llm,
            inventory,
            slots,
        }
    }

    async fn harness(llm: MockLlmClient) -> Harness {
        harness_with(llm, Arc::new(MemorySlotStore::new())).await
    }

    fn items(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    async fn last_assistant_id(controller: &SessionController) -> String {
        controller.timeline().await.last().unwrap().id.clone()
    }

    #[tokio::test]
    async fn test_start_seeds_greeting() {
        let h = harness(MockLlmClient::new()).await;
        let snapshot = h.controller.snapshot().await;
        assert_eq!(snapshot.phase, SessionPhase::Idle);
        assert_eq!(snapshot.timeline.len(), 1);
        assert!(snapshot.selection.is_none());
        assert_eq!(h.controller.suggestions().await.len(), 4);
    }

    #[tokio::test]
    async fn test_send_empty_is_noop() {
        let h = harness(MockLlmClient::new()).await;
        assert_eq!(h.controller.send("   ").await, SendOutcome::Ignored);
        assert_eq!(h.controller.timeline().await.len(), 1);
        assert_eq!(h.controller.phase(), SessionPhase::Idle);
        assert!(h.llm.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_send_appends_pair_and_persists() {
        let h = harness(MockLlmClient::with_replies([
            "Use rice.\n+++INGREDIENTS: Rice, Salt, +++",
        ]))
        .await;
        let outcome = h.controller.send("fried rice").await;
        assert!(matches!(outcome, SendOutcome::Replied { .. }));

        let timeline = h.controller.timeline().await;
        assert_eq!(timeline.len(), 3);
        assert_eq!(timeline.messages()[1].role, Role::User);
        let reply = timeline.last().unwrap();
        assert_eq!(reply.text, "Use rice.");
        assert_eq!(reply.ingredients, Some(items(&["Rice", "Salt"])));
        assert!(h.controller.suggestions().await.is_empty());

        h.controller.flush().await;
        assert!(h.slots.contains(TIMELINE_SLOT).await);
    }

    #[tokio::test]
    async fn test_overlapping_send_rejected_without_interleaving() {
        let (llm, gate) = MockLlmClient::gated();
        let h = harness(llm).await;

        let first = {
            let controller = h.controller.clone();
            tokio::spawn(async move { controller.send("a").await })
        };
        while h.controller.phase() != SessionPhase::Sending {
            tokio::task::yield_now().await;
        }
        assert_eq!(h.controller.send("b").await, SendOutcome::Rejected);
        assert!(h.controller.snapshot().await.input_locked());

        gate.release();
        assert!(matches!(first.await.unwrap(), SendOutcome::Replied { .. }));

        gate.release();
        assert!(matches!(h.controller.send("b").await, SendOutcome::Replied { .. }));
        let roles: Vec<Role> = h
            .controller
            .timeline()
            .await
            .messages()
            .iter()
            .map(|m| m.role)
            .collect();
        assert_eq!(
            roles,
            vec![Role::Assistant, Role::User, Role::Assistant, Role::User, Role::Assistant]
        );
        assert_eq!(h.llm.prompts(), vec!["a".to_string(), "b".to_string()]);
    }

    #[tokio::test]
    async fn test_reset_archives_history() {
        let h = harness(MockLlmClient::new()).await;
        h.controller.send("pancakes").await;
        let before = h.controller.timeline().await;

        assert!(h.controller.reset().await.unwrap());
        assert_eq!(h.controller.timeline().await.len(), 1);

        let summaries = h.controller.archive_summaries().await;
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].title, "pancakes");
        h.controller.restore(0).await.unwrap();
        assert_eq!(h.controller.timeline().await, before);
    }

    #[tokio::test]
    async fn test_reset_without_history_does_not_archive() {
        let h = harness(MockLlmClient::new()).await;
        assert!(!h.controller.reset().await.unwrap());
        assert!(h.controller.archive_summaries().await.is_empty());
    }

    #[tokio::test]
    async fn test_reset_while_sending_is_busy() {
        let (llm, gate) = MockLlmClient::gated();
        let h = harness(llm).await;
        let pending = {
            let controller = h.controller.clone();
            tokio::spawn(async move { controller.send("soup").await })
        };
        while h.controller.phase() != SessionPhase::Sending {
            tokio::task::yield_now().await;
        }
        assert!(matches!(h.controller.reset().await, Err(SessionError::Busy)));
        gate.release();
        pending.await.unwrap();
        assert!(h.controller.reset().await.is_ok());

        // reset 结束后单飞标记已释放
        assert_eq!(h.controller.phase(), SessionPhase::Idle);
        gate.release();
        assert!(matches!(h.controller.send("stew").await, SendOutcome::Replied { .. }));
    }

    #[tokio::test]
    async fn test_restore_while_sending_receives_reply() {
        let (llm, gate) = MockLlmClient::gated();
        let h = harness(llm).await;
        gate.release();
        h.controller.send("pancakes").await;
        h.controller.reset().await.unwrap();

        let pending = {
            let controller = h.controller.clone();
            tokio::spawn(async move { controller.send("soup").await })
        };
        while h.controller.phase() != SessionPhase::Sending {
            tokio::task::yield_now().await;
        }
        h.controller.restore(0).await.unwrap();
        assert_eq!(h.controller.phase(), SessionPhase::Sending);

        gate.release();
        assert!(matches!(pending.await.unwrap(), SendOutcome::Replied { .. }));
        assert_eq!(h.controller.phase(), SessionPhase::Idle);

        let timeline = h.controller.timeline().await;
        let messages = timeline.messages();
        assert_eq!(messages.len(), 5);
        assert_eq!(messages[1].text, "pancakes");
        assert_eq!(messages[3].role, Role::User);
        assert_eq!(messages[3].text, "soup");
        assert_eq!(messages[4].role, Role::Assistant);
        assert!(!messages[4].is_error);
    }

    #[tokio::test]
    async fn test_restore_missing_index() {
        let h = harness(MockLlmClient::new()).await;
        assert!(matches!(
            h.controller.restore(3).await,
            Err(SessionError::ArchiveEntryNotFound(3))
        ));
    }

    #[tokio::test]
    async fn test_restore_closes_selection() {
        let h = harness(MockLlmClient::new()).await;
        h.controller.send("omelette").await;
        let id = last_assistant_id(&h.controller).await;
        h.controller.reset().await.unwrap();
        h.controller.restore(0).await.unwrap();

        h.controller.open_selection(&id).await.unwrap();
        h.controller.restore(0).await.unwrap();
        assert!(h.controller.selection().await.is_none());
    }

    #[tokio::test]
    async fn test_open_selection_requires_ingredients() {
        let h = harness(MockLlmClient::with_replies(["No list here"])).await;
        h.controller.send("hello").await;
        let id = last_assistant_id(&h.controller).await;
        assert!(matches!(
            h.controller.open_selection(&id).await,
            Err(SessionError::NoIngredients(_))
        ));
        assert!(matches!(
            h.controller.commit_selection().await,
            Err(SessionError::NoSelection)
        ));
    }

    #[tokio::test]
    async fn test_commit_empty_is_noop() {
        let h = harness(MockLlmClient::new()).await;
        h.controller.send("fried rice").await;
        let id = last_assistant_id(&h.controller).await;

        let outcome = h.controller.commit(&id, &[]).await.unwrap();
        assert!(matches!(outcome, CommitOutcome::Skipped));
        assert!(h.inventory.batches().is_empty());
        assert!(!h.controller.timeline().await.get(&id).unwrap().committed);
    }

    #[tokio::test]
    async fn test_commit_selection_marks_and_continues_once() {
        let h = harness(MockLlmClient::with_replies([
            "Crepes.\n+++INGREDIENTS: Egg, Milk, Flour +++",
            "Step 1: whisk.",
        ]))
        .await;
        h.controller.send("crepes").await;
        let id = last_assistant_id(&h.controller).await;

        h.controller.open_selection(&id).await.unwrap();
        assert_eq!(h.controller.toggle_selection("Flour").await, Some(false));

        let outcome = h.controller.commit_selection().await.unwrap();
        let CommitOutcome::Committed { count, continuation } = outcome else {
            panic!("expected commit");
        };
        assert_eq!(count, 2);
        assert!(h.controller.selection().await.is_none());
        assert!(h.controller.timeline().await.get(&id).unwrap().committed);

        let records = h.inventory.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Egg");
        assert_eq!(records[1].name, "Milk");

        assert!(matches!(continuation.await.unwrap(), SendOutcome::Replied { .. }));
        let prompts = h.llm.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].contains("added 2 items"));
        assert_eq!(h.controller.timeline().await.last().unwrap().text, "Step 1: whisk.");
    }

    #[tokio::test]
    async fn test_commit_failure_leaves_uncommitted() {
        let h = harness(MockLlmClient::new()).await;
        h.controller.send("fried rice").await;
        let id = last_assistant_id(&h.controller).await;
        h.inventory.set_failing(true);
        let mut events = h.controller.subscribe();

        h.controller.open_selection(&id).await.unwrap();
        let result = h.controller.commit_selection().await;
        assert!(matches!(result, Err(SessionError::Sink(_))));
        assert!(!h.controller.timeline().await.get(&id).unwrap().committed);
        assert!(h.controller.selection().await.is_some());

        assert!(matches!(
            events.recv().await.unwrap(),
            SessionEvent::SelectionOpened { .. }
        ));
        assert!(matches!(
            events.recv().await.unwrap(),
            SessionEvent::CommitFailed { .. }
        ));
        assert_eq!(h.llm.prompts().len(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_cancels_pending_continuation() {
        let h = harness(MockLlmClient::new()).await;
        h.controller.send("fried rice").await;
        let id = last_assistant_id(&h.controller).await;

        let continuation = h.controller.schedule_continuation(
            "continue".to_string(),
            Duration::from_secs(60),
        );
        h.controller.shutdown().await;
        assert_eq!(continuation.await.unwrap(), SendOutcome::Cancelled);
        assert_eq!(h.controller.send("after").await, SendOutcome::Cancelled);
        assert_eq!(h.llm.prompts().len(), 1);
        assert!(!h.controller.timeline().await.get(&id).unwrap().committed);
    }

    #[tokio::test]
    async fn test_auto_start_fires_once() {
        let slots = Arc::new(MemorySlotStore::new());
        let mailbox = IntentMailbox::new(slots.clone());
        mailbox.post("Shakshuka").await.unwrap();

        let h = harness_with(MockLlmClient::new(), slots.clone()).await;
        let intent = mailbox.take().await.unwrap();
        let task = h.controller.auto_start(intent).unwrap();
        assert!(matches!(task.await.unwrap(), SendOutcome::Replied { .. }));

        // 第二次呈现同一意图：信箱已空，实例锁存也拒绝
        assert!(mailbox.take().await.is_none());
        let again = StartCooking::new("Shakshuka").unwrap();
        assert!(h.controller.auto_start(again).is_none());

        let prompts = h.llm.prompts();
        assert_eq!(
            prompts,
            vec!["I want to cook Shakshuka. Guide me and list the ingredients.".to_string()]
        );
    }

    #[tokio::test]
    async fn test_restart_restores_persisted_timeline() {
        let slots = Arc::new(MemorySlotStore::new());
        let h = harness_with(MockLlmClient::new(), slots.clone()).await;
        h.controller.send("risotto").await;
        let before = h.controller.timeline().await;
        h.controller.shutdown().await;

        let restarted = harness_with(MockLlmClient::new(), slots).await;
        assert_eq!(restarted.controller.timeline().await, before);
    }
}
