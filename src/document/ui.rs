use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

use super::{ElementPath, Shared, UiDocument};
use crate::error::DocumentError;
use crate::value::{Reflect, Value, store_attribute};

const NAME_ATTRIBUTE: &str = "Name";
const STYLE_ATTRIBUTE: &str = "Style";

/// An element of the ui hierarchy. Children are addressed by index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiElement {
    type_name: String,
    name: String,
    style: Option<String>,
    attributes: BTreeMap<String, Value>,
    children: Vec<UiElement>,
}

impl UiElement {
    pub fn new(type_name: &str, name: &str) -> Self {
        Self {
            type_name: type_name.to_owned(),
            name: name.to_owned(),
            style: None,
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_style(mut self, style: &str) -> Self {
        self.style = Some(style.to_owned());
        self
    }

    pub fn with_attribute(mut self, name: &str, value: impl Into<Value>) -> Self {
        store_attribute(&mut self.attributes, name, value.into());
        self
    }

    pub fn with_child(mut self, child: UiElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    pub fn children(&self) -> &[UiElement] {
        &self.children
    }

    /// Append a child and return its index
    pub fn push_child(&mut self, child: UiElement) -> usize {
        self.children.push(child);
        self.children.len() - 1
    }
}

impl Reflect for UiElement {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        match name {
            NAME_ATTRIBUTE => Some(Value::Text(self.name.clone())),
            STYLE_ATTRIBUTE => Some(
                self.style
                    .clone()
                    .map(Value::Text)
                    .unwrap_or(Value::Empty),
            ),
            _ => self.attributes.get(name).cloned(),
        }
    }

    fn set_attribute(&mut self, name: &str, value: Value) -> bool {
        match (name, value) {
            (NAME_ATTRIBUTE, Value::Text(text)) => self.name = text,
            (NAME_ATTRIBUTE, _) => return false,
            (STYLE_ATTRIBUTE, Value::Text(style)) => self.style = Some(style),
            (STYLE_ATTRIBUTE, Value::Empty) => self.style = None,
            (STYLE_ATTRIBUTE, _) => return false,
            (_, value) => store_attribute(&mut self.attributes, name, value),
        }
        true
    }

    fn attribute_names(&self) -> Vec<String> {
        [NAME_ATTRIBUTE, STYLE_ATTRIBUTE]
            .into_iter()
            .map(str::to_owned)
            .chain(self.attributes.keys().cloned())
            .collect()
    }
}

/// Named styles holding default attribute values for the elements that use them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleSheet {
    styles: BTreeMap<String, BTreeMap<String, Value>>,
}

impl StyleSheet {
    pub fn get(&self, style: &str, attribute: &str) -> Option<&Value> {
        self.styles.get(style)?.get(attribute)
    }

    /// Set a style entry. [`Value::Empty`] removes it, and a style left without entries is dropped.
    pub fn set(&mut self, style: &str, attribute: &str, value: Value) {
        if value.is_empty() {
            if let Some(entries) = self.styles.get_mut(style) {
                entries.remove(attribute);
                if entries.is_empty() {
                    self.styles.remove(style);
                }
            }
            return;
        }
        self.styles
            .entry(style.to_owned())
            .or_default()
            .insert(attribute.to_owned(), value);
    }

    /// Every attribute a style defines
    pub fn entries(&self, style: &str) -> impl Iterator<Item = (&str, &Value)> {
        self.styles
            .get(style)
            .into_iter()
            .flatten()
            .map(|(attribute, value)| (attribute.as_str(), value))
    }

    pub fn style_names(&self) -> impl Iterator<Item = &str> {
        self.styles.keys().map(String::as_str)
    }
}

/// In-memory ui document: an element tree plus the style sheet it is rendered with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiRoot {
    id: Uuid,
    root: UiElement,
    style_sheet: StyleSheet,
}

impl UiRoot {
    pub fn new(root: UiElement) -> Self {
        Self {
            id: Uuid::new_v4(),
            root,
            style_sheet: StyleSheet::default(),
        }
    }

    pub fn with_style_sheet(mut self, style_sheet: StyleSheet) -> Self {
        self.style_sheet = style_sheet;
        self
    }

    pub fn into_shared(self) -> Shared<Self> {
        Arc::new(RwLock::new(self))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn root(&self) -> &UiElement {
        &self.root
    }

    pub fn style_sheet(&self) -> &StyleSheet {
        &self.style_sheet
    }

    pub fn resolve(&self, path: &ElementPath) -> Option<&UiElement> {
        path.indices()
            .iter()
            .try_fold(&self.root, |element, index| element.children.get(*index))
    }

    pub fn resolve_mut(&mut self, path: &ElementPath) -> Option<&mut UiElement> {
        let mut element = &mut self.root;
        for index in path.indices() {
            element = element.children.get_mut(*index)?;
        }
        Some(element)
    }

    /// The element's own attribute value, falling back to its style's default
    pub fn effective_attribute(&self, path: &ElementPath, name: &str) -> Option<Value> {
        let element = self.resolve(path)?;
        element.attribute(name).or_else(|| {
            let style = element.style.as_deref()?;
            self.style_sheet.get(style, name).cloned()
        })
    }
}

impl UiDocument for UiRoot {
    fn element(&self, path: &ElementPath) -> Option<&dyn Reflect> {
        self.resolve(path).map(|element| element as &dyn Reflect)
    }

    fn element_mut(&mut self, path: &ElementPath) -> Option<&mut dyn Reflect> {
        self.resolve_mut(path).map(|element| element as &mut dyn Reflect)
    }

    fn element_style(&self, path: &ElementPath) -> Option<String> {
        self.resolve(path)?.style.clone()
    }

    fn save_element(&self, path: &ElementPath) -> Result<Vec<u8>, DocumentError> {
        let element = self
            .resolve(path)
            .ok_or_else(|| DocumentError::ElementNotFound(path.clone()))?;
        Ok(serde_json::to_vec(element)?)
    }

    fn load_element(
        &mut self,
        parent: &ElementPath,
        index: usize,
        data: &[u8],
    ) -> Result<(), DocumentError> {
        let element: UiElement = serde_json::from_slice(data)?;
        let parent_element = self
            .resolve_mut(parent)
            .ok_or_else(|| DocumentError::ElementNotFound(parent.clone()))?;
        let index = index.min(parent_element.children.len());
        parent_element.children.insert(index, element);
        Ok(())
    }

    fn remove_element(&mut self, path: &ElementPath) -> Result<(), DocumentError> {
        let (Some(parent), Some(index)) = (path.parent(), path.last_index()) else {
            return Err(DocumentError::RootElement);
        };
        let parent_element = self
            .resolve_mut(&parent)
            .ok_or_else(|| DocumentError::ElementNotFound(path.clone()))?;
        if index >= parent_element.children.len() {
            return Err(DocumentError::ElementNotFound(path.clone()));
        }
        parent_element.children.remove(index);
        Ok(())
    }

    fn reparent_element(
        &mut self,
        path: &ElementPath,
        parent: &ElementPath,
        index: Option<usize>,
    ) -> Result<ElementPath, DocumentError> {
        if path.is_root() {
            return Err(DocumentError::RootElement);
        }
        if self.resolve(path).is_none() {
            return Err(DocumentError::ElementNotFound(path.clone()));
        }
        if self.resolve(parent).is_none() {
            return Err(DocumentError::ElementNotFound(parent.clone()));
        }
        let Some(parent) = parent.after_removal(path) else {
            return Err(DocumentError::CyclicElement {
                element: path.clone(),
                parent: parent.clone(),
            });
        };

        let data = self.save_element(path)?;
        self.remove_element(path)?;
        let children = self
            .resolve(&parent)
            .map(|element| element.children.len())
            .unwrap_or_default();
        let index = index.map_or(children, |index| index.min(children));
        self.load_element(&parent, index, &data)?;
        Ok(parent.child(index))
    }

    fn apply_element_style(
        &mut self,
        path: &ElementPath,
        style: Option<&str>,
    ) -> Result<(), DocumentError> {
        let Self {
            root, style_sheet, ..
        } = self;
        let mut element = root;
        for index in path.indices() {
            element = element
                .children
                .get_mut(*index)
                .ok_or_else(|| DocumentError::ElementNotFound(path.clone()))?;
        }
        element.style = style.map(str::to_owned);
        if let Some(style) = style {
            for (attribute, value) in style_sheet.entries(style) {
                store_attribute(&mut element.attributes, attribute, value.clone());
            }
        }
        Ok(())
    }

    fn style_value(&self, style: &str, attribute: &str) -> Option<Value> {
        self.style_sheet.get(style, attribute).cloned()
    }

    fn set_style_value(&mut self, style: &str, attribute: &str, value: Value) {
        self.style_sheet.set(style, attribute, value);
    }
}
