mod attribute;
mod component;
mod custom;
mod guard;
mod history;
mod node;
mod tracking;
mod ui;

use std::fmt;

pub use crate::error::CommandError;
pub use attribute::{AttributeTarget, EditAttribute};
pub use component::{CreateComponent, DeleteComponent};
pub use custom::{CustomCommand, Setter};
pub use guard::TrackGuard;
pub use history::{CommandGroup, GroupHandle, History, ReplayReport};
pub use node::{CreateNode, DeleteNode, ReparentNode};
pub use tracking::ValueScope;
pub use ui::{ApplyUiStyle, CreateUiElement, DeleteUiElement, EditStyleValue, ReparentUiElement};

/// Result type for command operations
pub type CommandResult = Result<(), CommandError>;

/// A reversible edit recorded into the [`History`].
///
/// Both directions resolve their target freshly from the live document. An
/// error means the target is gone and nothing was changed for this command.
pub trait Command: fmt::Debug {
    /// Go back in the state history
    fn undo(&mut self) -> CommandResult;

    /// Go forward in the state history
    fn redo(&mut self) -> CommandResult;

    /// Called after a successful `undo` or `redo`, once the whole group has been replayed
    fn on_modified(&mut self) {}
}
