/// Text editing widget as seen by the session: it displays whatever content it
/// is given and reports the user's edits back through the workspace.
pub trait TextBufferWidget {
    fn set_content(&mut self, content: &str);

    fn content(&self) -> String;
}
