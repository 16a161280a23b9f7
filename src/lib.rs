//! Core of a project-management escape room: rooms with walls and mission
//! points, embedded activities that judge answers against an error budget,
//! learning paths and the screen machine that ties them together.
//!
//! The crate draws through [`render::Canvas`] and reads
//! [`input::InputEvent`]s, so any front-end can host it.

pub mod activity;
pub mod error;
pub mod geometry;
pub mod input;
pub mod path;
pub mod player;
pub mod puzzle;
pub mod render;
pub mod room;
pub mod session;
pub mod settings;
pub mod shell;
pub mod timer;

pub use error::{EscapeError, Result};
pub use path::{ContentLibrary, LearningPath, PathRun};
pub use shell::{GameOverReason, GameShell, Screen};
