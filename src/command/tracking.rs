//! Continuous-edit tracking for drag-style inputs.
//!
//! A widget value that changes every frame while the user drags should land
//! in the history as one command from the value before the drag to the value
//! after it. [`History::track`] hands out a [`ValueScope`] each frame; the
//! tracker behind it lives in the history's value cache between frames and is
//! only queued as a command once the input is released.

use log::debug;
use std::fmt;

use super::{AttributeTarget, Command, CommandResult, CustomCommand, History, Setter};
use crate::value::Value;

/// One frame's view of a tracked widget value. Applies and records on drop.
pub struct ValueScope<'a, V>
where
    V: Clone + PartialEq + fmt::Debug + 'static,
{
    history: &'a mut History,
    id: egui::Id,
    value: V,
    action: Option<Box<CustomCommand<V>>>,
    /// Baseline and setter when tracking is disabled
    inert: Option<(V, Setter<V>)>,
    input_active: bool,
}

impl<V> ValueScope<'_, V>
where
    V: Clone + PartialEq + fmt::Debug + 'static,
{
    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    /// Mark the value as edited by the user. Stays set until the edit is committed.
    pub fn set_modified(&mut self, modified: bool) {
        if let Some(action) = self.action.as_mut() {
            action.modified |= modified;
        }
    }

    /// Whether the widget still holds the input (drag in progress, text field focused)
    pub fn set_input_active(&mut self, active: bool) {
        self.input_active = active;
    }

    /// False when the scope was opened with tracking disabled
    pub fn is_tracking(&self) -> bool {
        self.action.is_some()
    }
}

impl<V> Drop for ValueScope<'_, V>
where
    V: Clone + PartialEq + fmt::Debug + 'static,
{
    fn drop(&mut self) {
        if let Some((initial, setter)) = self.inert.take() {
            if self.value != initial {
                if let Err(error) = setter(&self.value) {
                    debug!("untracked value for {:?} not applied: {}", self.id, error);
                }
            }
            return;
        }
        let Some(mut action) = self.action.take() else {
            return;
        };

        action.current = self.value.clone();
        let changed = action.current != action.initial;
        if changed {
            if let Err(error) = action.redo() {
                debug!("preview for {:?} not applied: {}", self.id, error);
            }
        }

        if !self.input_active {
            if changed && action.modified {
                debug!(
                    "committing edit {:?} -> {:?}",
                    action.initial, action.current
                );
                self.history.push_pending(action);
                return;
            }
            action.initial = action.current.clone();
            action.modified = false;
        }

        let frame = self.history.frame();
        self.history
            .working_values_mut()
            .insert(self.id, frame, action);
    }
}

impl History {
    /// Open a continuous-edit scope for the widget `id` showing `current`.
    ///
    /// The tracker for `id` is reused across frames, so `setter` is only
    /// taken from the first call of an edit.
    pub fn track<V>(
        &mut self,
        id: egui::Id,
        current: V,
        setter: impl Fn(&V) -> CommandResult + 'static,
    ) -> ValueScope<'_, V>
    where
        V: Clone + PartialEq + fmt::Debug + 'static,
    {
        if !self.is_tracking_enabled() {
            let setter: Setter<V> = Box::new(setter);
            return ValueScope {
                history: self,
                id,
                value: current.clone(),
                action: None,
                inert: Some((current, setter)),
                input_active: false,
            };
        }

        let action = match self.working_values_mut().detach::<CustomCommand<V>>(id) {
            Some(mut action) => {
                action.current = current.clone();
                action
            }
            None => Box::new(CustomCommand::new(current.clone(), current.clone(), setter)),
        };
        ValueScope {
            history: self,
            id,
            value: current,
            action: Some(action),
            inert: None,
            input_active: false,
        }
    }

    /// Track a named attribute of `target`, writing edits back through it
    pub fn track_attribute(
        &mut self,
        id: egui::Id,
        target: AttributeTarget,
        name: &str,
        current: Value,
    ) -> ValueScope<'_, Value> {
        let name = name.to_owned();
        self.track(id, current, move |value: &Value| {
            target.write(&name, value.clone())
        })
    }
}
