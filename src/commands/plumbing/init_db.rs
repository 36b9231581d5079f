use crate::areas::repository::Repository;
use anyhow::{Context, bail};
use tracing::info;

impl Repository {
    /// Create the storage root, its object store and all shard directories
    pub fn init_db(&mut self) -> anyhow::Result<()> {
        let objects_path = self.database().objects_path();
        if objects_path.exists() {
            bail!(
                "object store already exists at {}",
                objects_path.display()
            );
        }

        std::fs::create_dir_all(self.root())
            .with_context(|| format!("unable to create {}", self.root().display()))?;
        self.database().init()?;

        info!(root = %self.root().display(), "initialized storage root");
        writeln!(
            self.writer(),
            "Initialized empty object store in {}",
            self.root().display()
        )?;

        Ok(())
    }
}
