//! 会话监管：拆除时的取消与后台任务收尾
//!
//! 持有会话级 CancellationToken：上游调用与延迟续接都挂在其子 token 上，控制器拆除时一并取消；
//! 后台任务登记在 TaskTracker 中，关闭时在超时内等待它们结束。

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// 会话级生命周期管理
#[derive(Debug)]
pub struct SessionSupervisor {
    /// 控制器拆除时触发
    cancel_token: CancellationToken,
    tasks: TaskTracker,
}

impl SessionSupervisor {
    pub fn new() -> Self {
        Self {
            cancel_token: CancellationToken::new(),
            tasks: TaskTracker::new(),
        }
    }

    /// 创建子 token（用于单次请求或单个后台任务）
    pub fn child_token(&self) -> CancellationToken {
        self.cancel_token.child_token()
    }

    pub fn is_shutdown(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    /// 在会话范围内启动后台任务
    pub fn spawn<F>(&self, task: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.tasks.spawn(task)
    }

    /// 取消所有在途工作，并在 timeout 内等待后台任务结束
    pub async fn shutdown(&self, timeout: Duration) {
        self.cancel_token.cancel();
        self.tasks.close();
        if tokio::time::timeout(timeout, self.tasks.wait()).await.is_err() {
            tracing::warn!(
                "{} session tasks still running after {:?}",
                self.tasks.len(),
                timeout
            );
        }
    }
}

impl Default for SessionSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_shutdown_cancels_children() {
        let supervisor = SessionSupervisor::new();
        let token = supervisor.child_token();
        let task = supervisor.spawn(async move {
            token.cancelled().await;
            "cancelled"
        });

        supervisor.shutdown(Duration::from_secs(1)).await;
        assert!(supervisor.is_shutdown());
        assert_eq!(task.await.unwrap(), "cancelled");
    }
}
