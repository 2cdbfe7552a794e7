//! Save and restore the session between runs.
//!
//! The saved blob is a JSON serialization of the player position and level
//! number. The loaded position is applied to a freshly regenerated maze
//! without legality checks, so a stale save can sit off the carved paths.
//! A failed load leaves the current state untouched.

use log::debug;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::PathBuf;

use crate::grid::Pos;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct SaveData {
    pub player: Pos,
    pub level: u32,
}

pub struct Saver {
    save_file: PathBuf,
}

impl Saver {
    /// A saver writing `savegame.json` in the given directory.
    pub fn new(mut data_dir: PathBuf) -> Self {
        data_dir.push("savegame.json");
        debug!("save game file: {data_dir:?}");
        Saver {
            save_file: data_dir,
        }
    }

    /// The saved state, or `None` when no save file exists.
    pub fn load(&self) -> Result<Option<SaveData>, Box<dyn Error>> {
        let file = match File::open(&self.save_file) {
            Ok(f) => f,
            Err(error) => match error.kind() {
                ErrorKind::NotFound => return Ok(None),
                _ => return Err(Box::new(error)),
            },
        };
        let reader = BufReader::new(file);
        let data: SaveData = serde_json::from_reader(reader)?;
        Ok(Some(data))
    }

    pub fn save(&self, data: &SaveData) -> Result<(), Box<dyn Error>> {
        let file = File::create(&self.save_file)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, data)?;
        writer.flush()?;
        Ok(())
    }
}
