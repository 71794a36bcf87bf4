//! 核心编排层：错误、事件、状态投影、会话监管与控制器

pub mod builder;
pub mod controller;
pub mod error;
pub mod events;
pub mod session_supervisor;
pub mod state;

pub use builder::{create_session_builder, SessionBuilder};
pub use controller::{SessionConfig, SessionController, SessionDeps};
pub use error::{SessionError, StorageError};
pub use events::SessionEvent;
pub use session_supervisor::SessionSupervisor;
pub use state::{SessionPhase, SessionSnapshot};
