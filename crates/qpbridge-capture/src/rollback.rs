//! Ordered undo actions for multi-step acquisitions.

/// Undo actions recorded while a multi-step change is applied to `T`.
///
/// On failure the caller unwinds the stack, running actions newest first. On
/// success it commits, discarding the actions without running them.
pub(crate) struct UndoStack<T> {
    actions: Vec<Box<dyn FnOnce(&mut T) + Send>>,
}

impl<T> UndoStack<T> {
    pub(crate) fn new() -> Self {
        Self {
            actions: Vec::new(),
        }
    }

    /// Records how to reverse the step that just succeeded.
    pub(crate) fn push(&mut self, action: impl FnOnce(&mut T) + Send + 'static) {
        self.actions.push(Box::new(action));
    }

    /// Reverses every recorded step, newest first.
    pub(crate) fn unwind(self, target: &mut T) {
        for action in self.actions.into_iter().rev() {
            action(target);
        }
    }

    /// Keeps the applied steps.
    pub(crate) fn commit(self) {
        drop(self.actions);
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.actions.len()
    }
}
