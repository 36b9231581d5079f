use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::config::Config;
use crate::error::Result;
use std::cell::{RefCell, RefMut};
use std::path::{Path, PathBuf};

/// A storage root together with the working tree it tracks
pub struct Repository {
    config: Config,
    writer: RefCell<Box<dyn std::io::Write>>,
    database: Database,
}

impl Repository {
    pub fn new(config: Config, writer: Box<dyn std::io::Write>) -> Self {
        let database = Database::new(config.root().join("objects").into_boxed_path());

        Repository {
            config,
            writer: RefCell::new(writer),
            database,
        }
    }

    pub fn root(&self) -> &Path {
        self.config.root()
    }

    pub fn workdir(&self) -> &Path {
        self.config.workdir()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Load the persisted index; a missing file is an empty index
    pub fn index(&self) -> Result<Index> {
        Index::load(self.root())
    }

    /// Resolve a staged path against the working tree
    pub fn workdir_path(&self, path: &Path) -> PathBuf {
        self.workdir().join(path)
    }
}
