//! Workslate Core Library
//!
//! Platform-agnostic data model and editing engine for the Workslate
//! multi-slide whiteboard.

pub mod assistant;
pub mod background;
pub mod config;
pub mod document;
pub mod editor;
pub mod eraser;
pub mod geometry;
pub mod history;
pub mod import;
pub mod input;
pub mod math_tools;
pub mod physics;
pub mod project;
pub mod selection;
pub mod shapes;
pub mod storage;
pub mod task;
pub mod tools;

pub use assistant::{Assistant, AssistantError, AssistantLevel, ChatSession, Language};
pub use background::{Background, CameraSource, GridType};
pub use config::{ConfigError, EditorConfig};
pub use document::{Document, ObjectIndex, Slide};
pub use editor::{Action, ChatTicket, Editor, Notice, NoticeLevel, TranslationTicket};
pub use geometry::Bounds;
pub use history::History;
pub use input::{ClickTracker, CursorIcon, MouseButton, PointerEvent};
pub use math_tools::{MathAction, MathToolKind, MathTools};
pub use physics::{PhysicsController, PhysicsWorld, RapierWorld};
pub use selection::{HandleKind, Selection};
pub use shapes::{Drawable, SerializableColor};
pub use storage::{LocalStore, Storage, StorageError};
pub use task::{FrameTask, LivenessToken};
pub use tools::{ToolKind, ToolSettings};
