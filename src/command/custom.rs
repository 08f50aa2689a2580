use std::fmt;

use super::{Command, CommandResult};

/// Applies a value to the document on behalf of a [`CustomCommand`]
pub type Setter<V> = Box<dyn Fn(&V) -> CommandResult>;

/// A command driven by caller-supplied closures.
///
/// Holds the value before and after the edit. Undo hands the initial value to
/// the undo setter, redo hands the current value to the redo setter (or the
/// undo setter when no separate redo setter was given).
pub struct CustomCommand<V> {
    pub(super) initial: V,
    pub(super) current: V,
    pub(super) modified: bool,
    on_undo: Setter<V>,
    on_redo: Option<Setter<V>>,
    on_modified: Option<Box<dyn FnMut()>>,
}

impl<V> CustomCommand<V> {
    pub fn new(initial: V, current: V, setter: impl Fn(&V) -> CommandResult + 'static) -> Self {
        Self {
            initial,
            current,
            modified: false,
            on_undo: Box::new(setter),
            on_redo: None,
            on_modified: None,
        }
    }

    /// Use a separate setter for redo
    pub fn with_redo(mut self, setter: impl Fn(&V) -> CommandResult + 'static) -> Self {
        self.on_redo = Some(Box::new(setter));
        self
    }

    /// Run `hook` after each successful replay
    pub fn with_modified_hook(mut self, hook: impl FnMut() + 'static) -> Self {
        self.on_modified = Some(Box::new(hook));
        self
    }

    pub fn initial(&self) -> &V {
        &self.initial
    }

    pub fn current(&self) -> &V {
        &self.current
    }
}

impl<V: fmt::Debug> fmt::Debug for CustomCommand<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomCommand")
            .field("initial", &self.initial)
            .field("current", &self.current)
            .field("modified", &self.modified)
            .finish_non_exhaustive()
    }
}

impl<V: fmt::Debug + 'static> Command for CustomCommand<V> {
    fn undo(&mut self) -> CommandResult {
        (self.on_undo)(&self.initial)
    }

    fn redo(&mut self) -> CommandResult {
        match &self.on_redo {
            Some(setter) => setter(&self.current),
            None => (self.on_undo)(&self.current),
        }
    }

    fn on_modified(&mut self) {
        if let Some(hook) = self.on_modified.as_mut() {
            hook();
        }
    }
}
