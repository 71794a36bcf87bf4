//! Nourish - 终端演示入口
//!
//! 初始化日志、按配置构建会话，然后从 stdin 逐行读取输入驱动控制器。
//! 普通文本作为提示词发送；以 `/` 开头的行是命令（/help 查看）。

use std::path::PathBuf;

use anyhow::Context;
use nourish::assistant::{CommitOutcome, IntentMailbox, SendOutcome};
use nourish::core::{create_session_builder, SessionController, SessionEvent};
use nourish::memory::{Message, Role};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::RecvError};

const HELP: &str = "\
commands:
  /reset            archive this conversation and start over
  /history          list archived conversations
  /restore N        reopen archived conversation N
  /clear-history    delete all archived conversations
  /select ID        pick ingredients from message ID
  /toggle ITEM      flip one ingredient in the open selection
  /commit           add the selected ingredients to the pantry
  /close            close the selection without adding
  /quit             exit";

struct Args {
    config: Option<PathBuf>,
    cook: Option<String>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args {
        config: None,
        cook: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                args.config = Some(iter.next().context("--config needs a path")?.into());
            }
            "--cook" => {
                args.cook = Some(iter.next().context("--cook needs a dish name")?);
            }
            other => anyhow::bail!("unknown argument: {}", other),
        }
    }
    Ok(args)
}

/// 消息 id 的前 8 个字符（按字符截取，不按字节）
fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

fn print_message(message: &Message) {
    let who = match (message.role, message.is_error) {
        (_, true) => "!!",
        (Role::User, _) => "you",
        (Role::Assistant, _) => "chef",
    };
    println!("[{}] {}> {}", short_id(&message.id), who, message.text);
    if let Some(items) = message.ingredients.as_ref().filter(|i| !i.is_empty()) {
        let mark = if message.committed { " (in pantry)" } else { "" };
        println!("    ingredients: {}{}", items.join(", "), mark);
    }
}

async fn print_timeline(controller: &SessionController) {
    for message in controller.timeline().await.messages() {
        print_message(message);
    }
    for suggestion in controller.suggestions().await {
        println!("    try: {}", suggestion);
    }
}

/// 按前缀解析消息 id（界面只显示前 8 位）
async fn resolve_message_id(controller: &SessionController, prefix: &str) -> Option<String> {
    controller
        .timeline()
        .await
        .messages()
        .iter()
        .find(|m| m.id.starts_with(prefix))
        .map(|m| m.id.clone())
}

async fn report_send(outcome: SendOutcome, controller: &SessionController) {
    match outcome {
        SendOutcome::Replied { .. } | SendOutcome::Failed { .. } => {
            if let Some(last) = controller.timeline().await.last() {
                print_message(last);
            }
        }
        SendOutcome::Rejected => println!("still waiting for the previous reply"),
        SendOutcome::Ignored | SendOutcome::Cancelled => {}
    }
}

/// 把入库失败转给 on_failure；落后时跳过丢失的事件继续监听，通道关闭才退出
async fn watch_commit_failures(
    mut events: broadcast::Receiver<SessionEvent>,
    on_failure: impl Fn(String),
) {
    loop {
        match events.recv().await {
            Ok(SessionEvent::CommitFailed { reason, .. }) => on_failure(reason),
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!("Event watcher lagged, skipped {} events", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }
}

/// 处理一条命令；返回 false 表示退出
async fn handle_command(controller: &SessionController, line: &str) -> bool {
    let (cmd, arg) = line.split_once(' ').unwrap_or((line, ""));
    let arg = arg.trim();
    match cmd {
        "/quit" | "/exit" => return false,
        "/help" => println!("{}", HELP),
        "/reset" => match controller.reset().await {
            Ok(_) => print_timeline(controller).await,
            Err(e) => println!("cannot reset: {}", e),
        },
        "/history" => {
            let summaries = controller.archive_summaries().await;
            if summaries.is_empty() {
                println!("no archived conversations");
            }
            for (i, s) in summaries.iter().enumerate() {
                println!(
                    "{:>2}. {} ({} messages, {})",
                    i,
                    s.title,
                    s.message_count,
                    s.last_activity.format("%Y-%m-%d %H:%M")
                );
            }
        }
        "/restore" => match arg.parse::<usize>() {
            Ok(index) => match controller.restore(index).await {
                Ok(()) => print_timeline(controller).await,
                Err(e) => println!("cannot restore: {}", e),
            },
            Err(_) => println!("usage: /restore N"),
        },
        "/clear-history" => {
            controller.clear_archive().await;
            println!("history cleared");
        }
        "/select" => match resolve_message_id(controller, arg).await {
            Some(id) => match controller.open_selection(&id).await {
                Ok(selection) => {
                    for item in selection.items() {
                        let mark = if selection.is_selected(item) { "x" } else { " " };
                        println!("  [{}] {}", mark, item);
                    }
                }
                Err(e) => println!("cannot select: {}", e),
            },
            None => println!("no message starts with '{}'", arg),
        },
        "/toggle" => match controller.toggle_selection(arg).await {
            Some(on) => println!("{} {}", if on { "+" } else { "-" }, arg),
            None => println!("'{}' is not in the open selection", arg),
        },
        "/commit" => match controller.commit_selection().await {
            Ok(CommitOutcome::Committed { count, continuation }) => {
                println!("added {} items to your pantry", count);
                if let Ok(outcome) = continuation.await {
                    report_send(outcome, controller).await;
                }
            }
            Ok(CommitOutcome::Skipped) => println!("nothing selected"),
            Err(e) => println!("could not add to pantry: {}", e),
        },
        "/close" => {
            controller.close_selection().await;
        }
        other => println!("unknown command {} (try /help)", other),
    }
    true
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    nourish::observability::init();

    let args = parse_args()?;
    let builder = create_session_builder(args.config);
    let slots = builder.build_slots();
    let builder = builder.with_slots(slots.clone());

    if let Some(dish) = args.cook.as_deref() {
        IntentMailbox::new(slots)
            .post(dish)
            .await
            .context("Failed to post start-cooking intent")?;
    }

    let (controller, auto_start) = builder.build().await;

    tokio::spawn(watch_commit_failures(controller.subscribe(), |reason| {
        eprintln!("pantry update failed: {}", reason);
    }));

    print_timeline(&controller).await;
    if let Some(task) = auto_start {
        if let Ok(outcome) = task.await {
            // 自动发送的提示词也显示出来
            let timeline = controller.timeline().await;
            if let Some(prompt) = timeline.messages().iter().rev().nth(1) {
                print_message(prompt);
            }
            report_send(outcome, &controller).await;
        }
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let line = line.trim();
        if line.starts_with('/') {
            if !handle_command(&controller, line).await {
                break;
            }
        } else {
            let outcome = controller.send(line).await;
            report_send(outcome, &controller).await;
        }
    }

    controller.shutdown().await;
    Ok(())
}
