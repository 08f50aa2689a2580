use editor_undo::command::{
    AttributeTarget, Command, CommandError, CreateComponent, CreateNode, DeleteComponent,
    DeleteNode, EditAttribute, History, ReparentNode,
};
use editor_undo::document::{ComponentId, NodeId, Scene, SceneDocument, Shared};
use editor_undo::{DocumentError, Reflect, Value};
use parking_lot::RwLock;
use std::sync::Arc;

// Root with two children; the first has a child of its own and a component
fn create_test_scene() -> (Shared<Scene>, NodeId, NodeId, NodeId, ComponentId) {
    let mut scene = Scene::new("Root");
    let root = scene.root();
    let body = scene.create_child(root, "Body").unwrap();
    let wheel = scene.create_child(body, "Wheel").unwrap();
    let lamp = scene.create_child(root, "Lamp").unwrap();
    let light = scene.create_component(body, "Light").unwrap();
    scene
        .component_mut(light)
        .unwrap()
        .set_attribute("Intensity", Value::Float(1.0));
    (scene.into_shared(), body, wheel, lamp, light)
}

fn snapshot(scene: &Shared<Scene>) -> Vec<u8> {
    let scene = scene.read();
    scene.save_node(scene.root()).unwrap()
}

fn node_attribute(scene: &Shared<Scene>, node: NodeId, name: &str) -> Option<Value> {
    scene.read().node(node)?.attribute(name)
}

#[test]
fn test_create_node_round_trip() {
    let (scene, body, ..) = create_test_scene();
    let before = snapshot(&scene);

    let node = scene.write().create_child(body, "Spoiler").unwrap();
    let after = snapshot(&scene);
    let mut history = History::new();
    history.record(vec![Box::new(CreateNode::capture(&scene, node).unwrap())]);

    assert!(history.undo());
    assert!(!scene.read().contains_node(node));
    assert_eq!(snapshot(&scene), before);

    assert!(history.redo());
    assert_eq!(scene.read().parent_of(node), Some(body));
    assert_eq!(snapshot(&scene), after);
}

#[test]
fn test_delete_node_restores_subtree_at_same_index() {
    let (scene, body, wheel, lamp, light) = create_test_scene();
    let before = snapshot(&scene);
    let root = scene.read().root();

    let mut history = History::new();
    history
        .execute(DeleteNode::capture(&scene, body).unwrap())
        .unwrap();
    history.end_frame();
    assert!(!scene.read().contains_node(wheel));
    assert_eq!(scene.read().child_index(lamp), Some(0));

    assert!(history.undo());
    assert_eq!(snapshot(&scene), before);
    assert_eq!(scene.read().child_index(body), Some(0));
    assert_eq!(scene.read().parent_of(body), Some(root));
    assert_eq!(scene.read().component_owner(light), Some(body));

    assert!(history.redo());
    assert!(!scene.read().contains_node(body));
}

#[test]
fn test_capture_rejects_root_and_missing_nodes() {
    let (scene, ..) = create_test_scene();
    let root = scene.read().root();
    assert_eq!(
        DeleteNode::capture(&scene, root).unwrap_err(),
        CommandError::Document(DocumentError::RootNode)
    );
    assert_eq!(
        DeleteNode::capture(&scene, NodeId(99)).unwrap_err(),
        CommandError::Document(DocumentError::NodeNotFound(NodeId(99)))
    );
}

#[test]
fn test_reparent_restores_original_child_order() {
    let (scene, body, wheel, lamp, _) = create_test_scene();
    let before = snapshot(&scene);

    let mut command = ReparentNode::capture(&scene, body, lamp).unwrap();
    command.redo().unwrap();
    assert_eq!(scene.read().parent_of(body), Some(lamp));
    assert_eq!(scene.read().parent_of(wheel), Some(body));

    command.undo().unwrap();
    assert_eq!(scene.read().child_index(body), Some(0));
    assert_eq!(snapshot(&scene), before);
}

#[test]
fn test_batch_reparent_with_missing_node() {
    let (scene, body, wheel, lamp, _) = create_test_scene();
    let root = scene.read().root();

    let mut command = ReparentNode::capture_many(&scene, &[wheel, lamp], body)
        .unwrap()
        .at_index(0);
    assert_eq!(command.nodes().collect::<Vec<_>>(), vec![wheel, lamp]);
    command.redo().unwrap();
    assert_eq!(scene.read().child_index(wheel), Some(0));
    assert_eq!(scene.read().child_index(lamp), Some(1));

    // One node disappears; the other still moves back.
    scene.write().remove_node(wheel).unwrap();
    command.undo().unwrap();
    assert_eq!(scene.read().parent_of(lamp), Some(root));

    scene.write().remove_node(lamp).unwrap();
    assert!(command.redo().is_err());
}

#[test]
fn test_batch_reorder_within_one_parent() {
    let mut scene = Scene::new("Root");
    let root = scene.root();
    let [a, b, c, d] =
        ["A", "B", "C", "D"].map(|name| scene.create_child(root, name).unwrap());
    let scene = scene.into_shared();
    let before = snapshot(&scene);
    let order = |scene: &Shared<Scene>| {
        let scene = scene.read();
        let mut nodes = vec![a, b, c, d];
        nodes.sort_by_key(|&node| scene.child_index(node));
        nodes
    };

    let mut command = ReparentNode::capture_many(&scene, &[a, b], root)
        .unwrap()
        .at_index(2);
    command.redo().unwrap();
    assert_eq!(order(&scene), vec![c, d, a, b]);

    command.undo().unwrap();
    assert_eq!(order(&scene), vec![a, b, c, d]);
    assert_eq!(snapshot(&scene), before);

    let mut command = ReparentNode::capture_many(&scene, &[c, d], root)
        .unwrap()
        .at_index(0);
    command.redo().unwrap();
    assert_eq!(order(&scene), vec![c, d, a, b]);
    command.undo().unwrap();
    assert_eq!(snapshot(&scene), before);
}

#[test]
fn test_reparent_into_descendant_is_rejected() {
    let (scene, body, wheel, ..) = create_test_scene();
    let mut history = History::new();
    let result = history.execute(ReparentNode::capture(&scene, body, wheel).unwrap());
    assert_eq!(
        result,
        Err(CommandError::Document(DocumentError::CyclicParent {
            node: body,
            parent: wheel
        }))
    );
    assert_eq!(history.pending_len(), 0);
}

#[test]
fn test_component_create_and_delete() {
    let (scene, _, wheel, _, light) = create_test_scene();
    let before = snapshot(&scene);
    let mut history = History::new();

    history
        .execute(DeleteComponent::capture(&scene, light).unwrap())
        .unwrap();
    history.end_frame();
    assert!(scene.read().component(light).is_none());

    let added = scene.write().create_component(wheel, "Collider").unwrap();
    history.add(CreateComponent::capture(&scene, added).unwrap());
    history.end_frame();

    assert!(history.undo());
    assert!(scene.read().component(added).is_none());
    assert!(history.undo());
    assert_eq!(snapshot(&scene), before);
    assert_eq!(
        scene.read().component(light).unwrap().attribute("Intensity"),
        Some(Value::Float(1.0))
    );

    assert!(history.redo());
    assert!(scene.read().component(light).is_none());
}

#[test]
fn test_edit_attribute_on_node_and_component() {
    let (scene, body, _, _, light) = create_test_scene();
    let mut history = History::new();

    history
        .execute(
            EditAttribute::capture(AttributeTarget::node(&scene, body), "Name", "Chassis".into())
                .unwrap(),
        )
        .unwrap();
    history
        .execute(
            EditAttribute::capture(
                AttributeTarget::component(&scene, light),
                "Intensity",
                Value::Float(4.0),
            )
            .unwrap(),
        )
        .unwrap();
    history.end_frame();
    assert_eq!(scene.read().get_node(body).unwrap().name(), "Chassis");

    assert!(history.undo());
    assert_eq!(scene.read().get_node(body).unwrap().name(), "Body");
    assert_eq!(
        scene.read().component(light).unwrap().attribute("Intensity"),
        Some(Value::Float(1.0))
    );
}

#[test]
fn test_new_attribute_is_removed_on_undo() {
    let (scene, body, ..) = create_test_scene();
    let mut command =
        EditAttribute::capture(AttributeTarget::node(&scene, body), "Mass", Value::Int(3)).unwrap();
    assert_eq!(command.old_value(), &Value::Empty);

    command.redo().unwrap();
    assert_eq!(node_attribute(&scene, body, "Mass"), Some(Value::Int(3)));
    command.undo().unwrap();
    assert_eq!(node_attribute(&scene, body, "Mass"), None);
}

#[test]
fn test_rejected_attribute_value() {
    let (scene, body, ..) = create_test_scene();
    let mut command = EditAttribute::new(
        AttributeTarget::node(&scene, body),
        "Name",
        Value::Text("Body".into()),
        Value::Int(7),
    );
    assert!(matches!(
        command.redo(),
        Err(CommandError::AttributeRejected { .. })
    ));
}

#[test]
fn test_deleted_target_fails_without_changes() {
    let (scene, body, wheel, ..) = create_test_scene();
    let mut command =
        EditAttribute::capture(AttributeTarget::node(&scene, wheel), "Mass", Value::Int(1)).unwrap();
    scene.write().remove_node(body).unwrap();
    let before = snapshot(&scene);

    assert_eq!(
        command.redo(),
        Err(CommandError::Document(DocumentError::NodeNotFound(wheel)))
    );
    assert_eq!(snapshot(&scene), before);
}

#[test]
fn test_dropped_scene_expires_commands() {
    let (scene, body, _, lamp, light) = create_test_scene();
    let node = scene.write().create_child(lamp, "Bulb").unwrap();
    let mut history = History::new();
    history.add(CreateNode::capture(&scene, node).unwrap());
    history.add(ReparentNode::capture(&scene, body, lamp).unwrap());
    history.add(DeleteComponent::capture(&scene, light).unwrap());
    let target = AttributeTarget::node(&scene, body);
    history.add(EditAttribute::capture(target.clone(), "Mass", Value::Int(2)).unwrap());
    history.end_frame();

    drop(scene);
    assert!(target.is_expired());

    assert!(history.undo());
    let report = history.last_replay().unwrap();
    assert_eq!((report.applied, report.failed), (0, 4));
    assert!(history.redo());
    assert_eq!(history.cursor(), 1);
}

#[test]
fn test_other_target_uses_direct_handle() {
    #[derive(Debug, Default)]
    struct Settings {
        volume: f64,
    }

    impl Reflect for Settings {
        fn type_name(&self) -> &str {
            "Settings"
        }

        fn attribute(&self, name: &str) -> Option<Value> {
            (name == "Volume").then_some(Value::Float(self.volume))
        }

        fn set_attribute(&mut self, name: &str, value: Value) -> bool {
            match (name, value.as_float()) {
                ("Volume", Some(volume)) => {
                    self.volume = volume;
                    true
                }
                _ => false,
            }
        }

        fn attribute_names(&self) -> Vec<String> {
            vec!["Volume".to_owned()]
        }
    }

    let settings = Arc::new(RwLock::new(Settings::default()));
    let mut command = EditAttribute::capture(
        AttributeTarget::other(&settings),
        "Volume",
        Value::Float(0.8),
    )
    .unwrap();
    command.redo().unwrap();
    assert_eq!(settings.read().volume, 0.8);
    command.undo().unwrap();
    assert_eq!(settings.read().volume, 0.0);
}
