use std::fmt;

use super::{Command, CommandError, CommandResult};
use crate::document::{ElementPath, Shared, UiDocument, WeakUi, downgrade_ui, upgrade};
use crate::error::DocumentError;
use crate::value::Value;

/// Path and serialized state of a ui element at capture time
struct ElementSnapshot {
    root: WeakUi,
    path: ElementPath,
    data: Vec<u8>,
}

impl ElementSnapshot {
    fn capture<U: UiDocument + 'static>(
        root: &Shared<U>,
        path: ElementPath,
    ) -> Result<Self, CommandError> {
        if path.is_root() {
            return Err(DocumentError::RootElement.into());
        }
        let data = root.read().save_element(&path)?;
        Ok(Self {
            root: downgrade_ui(root),
            path,
            data,
        })
    }

    fn restore(&self) -> CommandResult {
        let (Some(parent), Some(index)) = (self.path.parent(), self.path.last_index()) else {
            return Err(DocumentError::RootElement.into());
        };
        let handle = upgrade(&self.root)?;
        handle.write().load_element(&parent, index, &self.data)?;
        Ok(())
    }

    fn remove(&self) -> CommandResult {
        let handle = upgrade(&self.root)?;
        handle.write().remove_element(&self.path)?;
        Ok(())
    }

    /// Swap the live element at the path for the saved one
    fn replace(&self) -> CommandResult {
        let (Some(parent), Some(index)) = (self.path.parent(), self.path.last_index()) else {
            return Err(DocumentError::RootElement.into());
        };
        let handle = upgrade(&self.root)?;
        let mut document = handle.write();
        if document.element(&self.path).is_none() {
            return Err(CommandError::Unresolved(format!("ui element {}", self.path)));
        }
        document.remove_element(&self.path)?;
        document.load_element(&parent, index, &self.data)?;
        Ok(())
    }
}

impl fmt::Debug for ElementSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementSnapshot")
            .field("path", &self.path)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Records a ui element being inserted. Capture it after insertion.
#[derive(Debug)]
pub struct CreateUiElement(ElementSnapshot);

impl CreateUiElement {
    pub fn capture<U: UiDocument + 'static>(
        root: &Shared<U>,
        path: ElementPath,
    ) -> Result<Self, CommandError> {
        ElementSnapshot::capture(root, path).map(Self)
    }

    pub fn path(&self) -> &ElementPath {
        &self.0.path
    }
}

impl Command for CreateUiElement {
    fn undo(&mut self) -> CommandResult {
        self.0.remove()
    }

    fn redo(&mut self) -> CommandResult {
        self.0.restore()
    }
}

/// Records a ui element being removed. Capture it before removal.
#[derive(Debug)]
pub struct DeleteUiElement(ElementSnapshot);

impl DeleteUiElement {
    pub fn capture<U: UiDocument + 'static>(
        root: &Shared<U>,
        path: ElementPath,
    ) -> Result<Self, CommandError> {
        ElementSnapshot::capture(root, path).map(Self)
    }

    pub fn path(&self) -> &ElementPath {
        &self.0.path
    }
}

impl Command for DeleteUiElement {
    fn undo(&mut self) -> CommandResult {
        self.0.restore()
    }

    fn redo(&mut self) -> CommandResult {
        self.0.remove()
    }
}

/// Records moving a ui element under a new parent. Capture it before the move.
///
/// Paths are taken in the document as it was at capture time. The element's
/// path after the move is remembered by `redo` so `undo` can find it again.
#[derive(Debug)]
pub struct ReparentUiElement {
    root: WeakUi,
    path: ElementPath,
    new_parent: ElementPath,
    new_index: Option<usize>,
    moved_to: Option<ElementPath>,
}

impl ReparentUiElement {
    pub fn capture<U: UiDocument + 'static>(
        root: &Shared<U>,
        path: ElementPath,
        new_parent: ElementPath,
    ) -> Result<Self, CommandError> {
        if path.is_root() {
            return Err(DocumentError::RootElement.into());
        }
        {
            let document = root.read();
            if document.element(&path).is_none() {
                return Err(DocumentError::ElementNotFound(path).into());
            }
            if document.element(&new_parent).is_none() {
                return Err(DocumentError::ElementNotFound(new_parent).into());
            }
        }
        if path.contains(&new_parent) {
            return Err(DocumentError::CyclicElement {
                element: path,
                parent: new_parent,
            }
            .into());
        }
        Ok(Self {
            root: downgrade_ui(root),
            path,
            new_parent,
            new_index: None,
            moved_to: None,
        })
    }

    /// Insert the element as child `index` of the new parent instead of appending it
    pub fn at_index(mut self, index: usize) -> Self {
        self.new_index = Some(index);
        self
    }

    pub fn path(&self) -> &ElementPath {
        &self.path
    }

    /// Where the element was placed by the last `redo`
    pub fn moved_to(&self) -> Option<&ElementPath> {
        self.moved_to.as_ref()
    }
}

impl Command for ReparentUiElement {
    fn undo(&mut self) -> CommandResult {
        let Some(moved) = &self.moved_to else {
            return Err(CommandError::Unresolved(format!("ui element {}", self.path)));
        };
        let (Some(old_parent), Some(old_index)) = (self.path.parent(), self.path.last_index())
        else {
            return Err(DocumentError::RootElement.into());
        };
        // Taking the element out never moves its own parent, but putting it in
        // at its new place can.
        let old_parent = old_parent.after_insertion(moved);
        let handle = upgrade(&self.root)?;
        handle
            .write()
            .reparent_element(moved, &old_parent, Some(old_index))?;
        Ok(())
    }

    fn redo(&mut self) -> CommandResult {
        let handle = upgrade(&self.root)?;
        let moved = handle
            .write()
            .reparent_element(&self.path, &self.new_parent, self.new_index)?;
        self.moved_to = Some(moved);
        Ok(())
    }
}

/// Records applying a named style to a ui element. Capture it before the style is applied.
///
/// Undo puts back the element exactly as it was saved, which also brings back
/// the attribute values the style overwrote.
#[derive(Debug)]
pub struct ApplyUiStyle {
    snapshot: ElementSnapshot,
    old_style: Option<String>,
    new_style: Option<String>,
}

impl ApplyUiStyle {
    pub fn capture<U: UiDocument + 'static>(
        root: &Shared<U>,
        path: ElementPath,
        new_style: Option<&str>,
    ) -> Result<Self, CommandError> {
        let old_style = root.read().element_style(&path);
        Ok(Self {
            snapshot: ElementSnapshot::capture(root, path)?,
            old_style,
            new_style: new_style.map(str::to_owned),
        })
    }

    pub fn path(&self) -> &ElementPath {
        &self.snapshot.path
    }

    pub fn old_style(&self) -> Option<&str> {
        self.old_style.as_deref()
    }

    pub fn new_style(&self) -> Option<&str> {
        self.new_style.as_deref()
    }
}

impl Command for ApplyUiStyle {
    fn undo(&mut self) -> CommandResult {
        self.snapshot.replace()
    }

    fn redo(&mut self) -> CommandResult {
        let handle = upgrade(&self.snapshot.root)?;
        handle
            .write()
            .apply_element_style(&self.snapshot.path, self.new_style.as_deref())?;
        Ok(())
    }
}

/// Records a change to the style sheet entry used by an element.
///
/// The element is only used to find the style and must still exist on replay.
/// [`Value::Empty`] on either side means the entry is absent.
pub struct EditStyleValue {
    root: WeakUi,
    path: ElementPath,
    style: String,
    attribute: String,
    old_value: Value,
    new_value: Value,
}

impl EditStyleValue {
    /// Capture the current entry of the element's style. Call it before the edit is applied.
    pub fn capture<U: UiDocument + 'static>(
        root: &Shared<U>,
        path: ElementPath,
        attribute: &str,
        new_value: Value,
    ) -> Result<Self, CommandError> {
        let (style, old_value) = {
            let document = root.read();
            if document.element(&path).is_none() {
                return Err(DocumentError::ElementNotFound(path).into());
            }
            let style = document
                .element_style(&path)
                .ok_or_else(|| DocumentError::MissingStyle(path.clone()))?;
            let old_value = document.style_value(&style, attribute).unwrap_or_default();
            (style, old_value)
        };
        Ok(Self {
            root: downgrade_ui(root),
            path,
            style,
            attribute: attribute.to_owned(),
            old_value,
            new_value,
        })
    }

    pub fn style(&self) -> &str {
        &self.style
    }

    pub fn old_value(&self) -> &Value {
        &self.old_value
    }

    pub fn new_value(&self) -> &Value {
        &self.new_value
    }

    fn apply(&self, value: &Value) -> CommandResult {
        let handle = upgrade(&self.root)?;
        let mut document = handle.write();
        if document.element(&self.path).is_none() {
            return Err(CommandError::Unresolved(format!("ui element {}", self.path)));
        }
        document.set_style_value(&self.style, &self.attribute, value.clone());
        Ok(())
    }
}

impl fmt::Debug for EditStyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditStyleValue")
            .field("path", &self.path)
            .field("style", &self.style)
            .field("attribute", &self.attribute)
            .field("old_value", &self.old_value)
            .field("new_value", &self.new_value)
            .finish()
    }
}

impl Command for EditStyleValue {
    fn undo(&mut self) -> CommandResult {
        self.apply(&self.old_value)
    }

    fn redo(&mut self) -> CommandResult {
        self.apply(&self.new_value)
    }
}
