pub mod assistant;
pub mod config;
pub mod fault;
pub mod prompt;
pub mod reply;
pub mod runtime;
pub mod state;

// Re-export main types for convenience
pub use assistant::Assistant;
pub use config::Config;
pub use fault::AssistError;
pub use reply::{FALLBACK_REPLY, ReplyShape};
pub use runtime::{
    ChatRuntime, GatewayClient, InvokeOptions, ReadyMonitor, RuntimeLauncher, ServeCommand,
};
pub use state::{ChatMessage, ChatRole};
