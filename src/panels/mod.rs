pub mod history_panel;
pub mod inspector_panel;
pub mod scene_panel;
