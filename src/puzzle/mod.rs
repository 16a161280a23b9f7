pub mod build;
pub mod loader;
pub mod types;

pub use build::build_room;
pub use loader::{load_path_dir, load_room};
pub use types::{Concept, Narrative, RoomDef, RoomMeta, TransitionRule};
