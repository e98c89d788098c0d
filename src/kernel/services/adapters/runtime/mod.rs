//! Async runtime adapter: executes remote effects and sends messages back to the owner of the store.

mod message;
mod runtime;

pub use message::AppMessage;
pub use runtime::{AsyncRuntime, RuntimeServices};
