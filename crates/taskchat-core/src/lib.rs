pub mod backend;
pub mod chat;
pub mod config;
pub mod error;
pub mod input;
pub mod state;
pub mod todo;

// Re-export main types for convenience
pub use backend::BackendClient;
pub use chat::{ChatPanel, Outgoing};
pub use config::Config;
pub use error::{BackendError, BackendResult};
pub use input::InputField;
pub use state::{ChatMessage, Sender, Todo, TodoId};
pub use todo::{LoadTicket, TodoPanel};
