//! Application layer: wires the kernel store to the runtime and a text widget.

mod workspace;

pub use workspace::Workspace;
