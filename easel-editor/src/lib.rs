//! easel-editor: editor session tying canvas, history and autosave together.

pub mod config;
pub mod script;
pub mod session;
pub mod tools;

pub use config::{load_config, EditorConfig};
pub use script::{load_script, EditCommand, ReplayReport};
pub use session::{EditorError, EditorSession, Style};
pub use tools::{ActiveTool, ToolEffect, ToolState, SELECTION_DEPENDENT_TOOLS};
