//! 助手工作流：回复解析、请求派发、食材选择、入库提交、启动意图与合成提示词

pub mod commit;
pub mod dispatcher;
pub mod intent;
pub mod prompts;
pub mod reply;
pub mod selection;

pub use commit::{CommitDispatcher, CommitOutcome, CommitTarget, DEFAULT_CONTINUATION_DELAY};
pub use dispatcher::{InFlightGuard, RequestDispatcher, SendOutcome, TimelineSink};
pub use intent::{IntentMailbox, StartCooking};
pub use prompts::{continuation_prompt, start_cooking_prompt, SUGGESTIONS};
pub use reply::{parse_reply, ParsedReply, INGREDIENTS_CLOSE, INGREDIENTS_OPEN};
pub use selection::{Selection, SelectionWorkflow};
