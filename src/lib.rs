#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod command;
pub mod config;
pub mod document;
pub mod error;
pub mod panels;
pub mod value;
pub mod value_cache;

pub use app::InspectorApp;
pub use command::{Command, CommandResult, History, TrackGuard, ValueScope};
pub use config::HistoryConfig;
pub use document::{ElementPath, NodeId, Scene, SceneDocument, UiDocument, UiRoot};
pub use error::{CommandError, ConfigError, DocumentError};
pub use value::{Reflect, Value};
pub use value_cache::ValueCache;
