use editor_undo::command::{
    ApplyUiStyle, AttributeTarget, Command, CommandError, CreateUiElement, DeleteUiElement,
    EditAttribute, EditStyleValue, History, ReparentUiElement,
};
use editor_undo::document::{ElementPath, Shared, StyleSheet, UiDocument, UiElement, UiRoot};
use editor_undo::{DocumentError, Value};

fn create_test_ui() -> Shared<UiRoot> {
    let mut styles = StyleSheet::default();
    styles.set("Primary", "Padding", Value::Int(4));
    UiRoot::new(
        UiElement::new("Window", "Main")
            .with_child(UiElement::new("Button", "Ok").with_style("Primary"))
            .with_child(
                UiElement::new("Panel", "Body")
                    .with_child(UiElement::new("Text", "Caption").with_attribute("Size", 12i64)),
            ),
    )
    .with_style_sheet(styles)
    .into_shared()
}

fn child_names(ui: &Shared<UiRoot>) -> Vec<String> {
    ui.read()
        .root()
        .children()
        .iter()
        .map(|child| child.name().to_owned())
        .collect()
}

#[test]
fn test_delete_element_restores_position() {
    let ui = create_test_ui();
    let before = ui.read().clone();
    let mut history = History::new();

    history
        .execute(DeleteUiElement::capture(&ui, ElementPath::new(vec![0])).unwrap())
        .unwrap();
    history.end_frame();
    assert_eq!(child_names(&ui), vec!["Body"]);

    assert!(history.undo());
    assert_eq!(*ui.read(), before);
    assert!(history.redo());
    assert_eq!(child_names(&ui), vec!["Body"]);
}

#[test]
fn test_create_element_undo_and_redo() {
    let ui = create_test_ui();
    let index = {
        let mut root = ui.write();
        let body = root.resolve_mut(&ElementPath::new(vec![1])).unwrap();
        body.push_child(UiElement::new("Image", "Logo"))
    };
    let path = ElementPath::new(vec![1, index]);
    let mut command = CreateUiElement::capture(&ui, path.clone()).unwrap();

    command.undo().unwrap();
    assert!(ui.read().resolve(&path).is_none());
    command.redo().unwrap();
    assert_eq!(ui.read().resolve(&path).unwrap().name(), "Logo");
}

#[test]
fn test_root_element_cannot_be_captured() {
    let ui = create_test_ui();
    assert_eq!(
        DeleteUiElement::capture(&ui, ElementPath::root()).unwrap_err(),
        CommandError::Document(DocumentError::RootElement)
    );
}

#[test]
fn test_edit_style_value_and_removal() {
    let ui = create_test_ui();
    let button = ElementPath::new(vec![0]);
    let mut history = History::new();

    history
        .execute(EditStyleValue::capture(&ui, button.clone(), "Padding", Value::Int(8)).unwrap())
        .unwrap();
    history
        .execute(EditStyleValue::capture(&ui, button.clone(), "Margin", Value::Int(2)).unwrap())
        .unwrap();
    history.end_frame();
    assert_eq!(ui.read().style_value("Primary", "Padding"), Some(Value::Int(8)));
    assert_eq!(
        ui.read().effective_attribute(&button, "Margin"),
        Some(Value::Int(2))
    );

    // Undoing a newly created entry removes it again.
    assert!(history.undo());
    assert_eq!(ui.read().style_value("Primary", "Padding"), Some(Value::Int(4)));
    assert_eq!(ui.read().style_value("Primary", "Margin"), None);

    history
        .execute(EditStyleValue::capture(&ui, button.clone(), "Padding", Value::Empty).unwrap())
        .unwrap();
    history.end_frame();
    assert_eq!(ui.read().style_value("Primary", "Padding"), None);
    assert!(history.undo());
    assert_eq!(ui.read().style_value("Primary", "Padding"), Some(Value::Int(4)));
}

#[test]
fn test_style_edit_requires_styled_element() {
    let ui = create_test_ui();
    let body = ElementPath::new(vec![1]);
    assert_eq!(
        EditStyleValue::capture(&ui, body.clone(), "Padding", Value::Int(1)).unwrap_err(),
        CommandError::Document(DocumentError::MissingStyle(body))
    );

    let missing = ElementPath::new(vec![5]);
    assert_eq!(
        EditStyleValue::capture(&ui, missing.clone(), "Padding", Value::Int(1)).unwrap_err(),
        CommandError::Document(DocumentError::ElementNotFound(missing))
    );
}

#[test]
fn test_style_edit_fails_once_element_is_gone() {
    let ui = create_test_ui();
    let button = ElementPath::new(vec![0]);
    let mut command = EditStyleValue::capture(&ui, button.clone(), "Padding", Value::Int(9)).unwrap();

    ui.write().remove_element(&button).unwrap();
    ui.write().remove_element(&button).unwrap();
    assert!(matches!(command.redo(), Err(CommandError::Unresolved(_))));
    assert_eq!(ui.read().style_value("Primary", "Padding"), Some(Value::Int(4)));
}

#[test]
fn test_element_attribute_by_path() {
    let ui = create_test_ui();
    let caption = ElementPath::new(vec![1, 0]);
    let target = AttributeTarget::ui_element(&ui, caption.clone());
    let mut history = History::new();

    history
        .execute(EditAttribute::capture(target.clone(), "Size", Value::Int(18)).unwrap())
        .unwrap();
    history
        .execute(EditAttribute::capture(target, "Style", "Primary".into()).unwrap())
        .unwrap();
    history.end_frame();
    assert_eq!(
        ui.read().effective_attribute(&caption, "Padding"),
        Some(Value::Int(4))
    );

    assert!(history.undo());
    let root = ui.read();
    let element = root.resolve(&caption).unwrap();
    assert_eq!(element.style(), None);
    assert_eq!(
        root.effective_attribute(&caption, "Size"),
        Some(Value::Int(12))
    );
}

#[test]
fn test_reparent_element_round_trip() {
    let ui = create_test_ui();
    let before = ui.read().clone();
    let mut history = History::new();

    // Caption leaves Body for the front of the root, shifting Body to /2.
    let caption = ElementPath::new(vec![1, 0]);
    let command = ReparentUiElement::capture(&ui, caption, ElementPath::root())
        .unwrap()
        .at_index(0);
    history.execute(command).unwrap();
    history.end_frame();
    assert_eq!(child_names(&ui), vec!["Caption", "Ok", "Body"]);
    let body = ElementPath::new(vec![2]);
    assert!(ui.read().resolve(&body).unwrap().children().is_empty());

    assert!(history.undo());
    assert_eq!(*ui.read(), before);
    assert!(history.redo());
    assert_eq!(child_names(&ui), vec!["Caption", "Ok", "Body"]);
}

#[test]
fn test_reparent_element_into_sibling() {
    let ui = create_test_ui();
    let before = ui.read().clone();
    let (button, body) = (ElementPath::new(vec![0]), ElementPath::new(vec![1]));
    let mut command = ReparentUiElement::capture(&ui, button, body).unwrap();

    command.redo().unwrap();
    let moved = command.moved_to().cloned().unwrap();
    assert_eq!(moved, ElementPath::new(vec![0, 1]));
    assert_eq!(ui.read().resolve(&moved).unwrap().name(), "Ok");

    command.undo().unwrap();
    assert_eq!(*ui.read(), before);
}

#[test]
fn test_reparent_element_rejects_cycles_and_root() {
    let ui = create_test_ui();
    let body = ElementPath::new(vec![1]);
    assert_eq!(
        ReparentUiElement::capture(&ui, body.clone(), body.child(0)).unwrap_err(),
        CommandError::Document(DocumentError::CyclicElement {
            element: body.clone(),
            parent: body.child(0),
        })
    );
    assert_eq!(
        ReparentUiElement::capture(&ui, ElementPath::root(), body).unwrap_err(),
        CommandError::Document(DocumentError::RootElement)
    );

    let (button, body) = (ElementPath::new(vec![0]), ElementPath::new(vec![1]));
    let mut command = ReparentUiElement::capture(&ui, button, body).unwrap();
    assert!(matches!(command.undo(), Err(CommandError::Unresolved(_))));
}

#[test]
fn test_apply_style_restores_overwritten_attributes() {
    let ui = create_test_ui();
    ui.write().set_style_value("Heading", "Size", Value::Int(24));
    let before = ui.read().clone();
    let caption = ElementPath::new(vec![1, 0]);
    let mut history = History::new();

    let command = ApplyUiStyle::capture(&ui, caption.clone(), Some("Heading")).unwrap();
    assert_eq!(command.old_style(), None);
    history.execute(command).unwrap();
    history.end_frame();
    {
        let root = ui.read();
        let element = root.resolve(&caption).unwrap();
        assert_eq!(element.style(), Some("Heading"));
        assert_eq!(root.effective_attribute(&caption, "Size"), Some(Value::Int(24)));
    }

    assert!(history.undo());
    assert_eq!(*ui.read(), before);
    assert!(history.redo());
    assert_eq!(ui.read().resolve(&caption).unwrap().style(), Some("Heading"));
}

#[test]
fn test_apply_style_fails_once_element_is_gone() {
    let ui = create_test_ui();
    let button = ElementPath::new(vec![0]);
    let mut command = ApplyUiStyle::capture(&ui, button.clone(), None).unwrap();
    assert_eq!(command.old_style(), Some("Primary"));

    command.redo().unwrap();
    assert_eq!(ui.read().resolve(&button).unwrap().style(), None);

    ui.write().remove_element(&button).unwrap();
    ui.write().remove_element(&button).unwrap();
    assert!(matches!(command.undo(), Err(CommandError::Unresolved(_))));
}
