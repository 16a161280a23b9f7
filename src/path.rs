use std::fmt;
use std::path::Path;

use clap::ValueEnum;
use log::info;

use crate::error::{EscapeError, Result};
use crate::puzzle::{build_room, load_path_dir, RoomDef};
use crate::room::Room;

/// A learning track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum)]
pub enum LearningPath {
    Pmbok,
    Scrum,
}

impl LearningPath {
    pub const ALL: [LearningPath; 2] = [LearningPath::Pmbok, LearningPath::Scrum];

    /// Content sub-directory holding this path's room files.
    pub fn dir_name(self) -> &'static str {
        match self {
            LearningPath::Pmbok => "pmbok",
            LearningPath::Scrum => "scrum",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            LearningPath::Pmbok => "PMBOK",
            LearningPath::Scrum => "Scrum",
        }
    }
}

impl fmt::Display for LearningPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Parsed room files for every path, read once at start-up.
#[derive(Debug)]
pub struct ContentLibrary {
    pmbok: Vec<RoomDef>,
    scrum: Vec<RoomDef>,
}

impl ContentLibrary {
    pub fn load(content_dir: &Path) -> Result<Self> {
        if !content_dir.is_dir() {
            return Err(EscapeError::NoContent(content_dir.to_path_buf()));
        }
        Ok(ContentLibrary {
            pmbok: load_path_dir(&content_dir.join(LearningPath::Pmbok.dir_name()))?,
            scrum: load_path_dir(&content_dir.join(LearningPath::Scrum.dir_name()))?,
        })
    }

    pub fn rooms(&self, path: LearningPath) -> &[RoomDef] {
        match path {
            LearningPath::Pmbok => &self.pmbok,
            LearningPath::Scrum => &self.scrum,
        }
    }

    /// Fresh rooms for one run. Room `i` shuffles with `seed + i`.
    pub fn build(&self, path: LearningPath, seed: u64) -> Result<PathRun> {
        let rooms = self
            .rooms(path)
            .iter()
            .enumerate()
            .map(|(i, def)| build_room(def, seed.wrapping_add(i as u64)))
            .collect::<Result<Vec<_>>>()?;
        PathRun::new(path, rooms)
    }
}

/// Ordered rooms of one path and the index of the room being played.
#[derive(Debug, Clone)]
pub struct PathRun {
    path: LearningPath,
    rooms: Vec<Room>,
    index: usize,
}

impl PathRun {
    pub fn new(path: LearningPath, rooms: Vec<Room>) -> Result<Self> {
        if rooms.is_empty() {
            return Err(EscapeError::EmptyPath(path.dir_name().to_string()));
        }
        Ok(PathRun {
            path,
            rooms,
            index: 0,
        })
    }

    pub fn path(&self) -> LearningPath {
        self.path
    }

    pub fn current_room(&self) -> &Room {
        &self.rooms[self.index]
    }

    pub fn current_room_mut(&mut self) -> &mut Room {
        &mut self.rooms[self.index]
    }

    pub fn has_next(&self) -> bool {
        self.index + 1 < self.rooms.len()
    }

    /// Moves to the next room. No-op returning false on the last one.
    pub fn advance(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        self.index += 1;
        info!(
            "{} path: entering room {}/{} ({})",
            self.path,
            self.index + 1,
            self.rooms.len(),
            self.current_room().meta().title
        );
        true
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Rooms left behind plus the current one if its activity is done.
    pub fn completed_rooms(&self) -> usize {
        self.index + usize::from(self.current_room().activity().machine().is_completed())
    }
}
