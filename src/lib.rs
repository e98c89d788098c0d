//! ghedit - remote repository editor library
//!
//! - models: lazily loaded file tree arena
//! - kernel: store, actions, effects, session and save protocol, services
//! - app: workspace driver tying the store to the runtime and a text widget

pub mod app;
pub mod kernel;
pub mod models;
