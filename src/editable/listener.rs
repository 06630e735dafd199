//! Listener collaborator contract.

/// Receives change notifications after a command completes.
///
/// Called synchronously once per command; every method defaults to a no-op.
pub trait EditListener {
    /// The buffer text changed
    fn text_changed(&mut self) {}

    /// Any caret or selection moved
    fn cursors_changed(&mut self) {}

    /// The undo/redo stacks changed
    fn history_changed(&mut self) {}
}
