use crate::areas::repository::Repository;
use crate::artifacts::objects::tree::Tree;
use crate::error::Error;
use tracing::info;

impl Repository {
    /// Snapshot the persisted index as a tree object and print its id
    pub fn write_tree(&mut self) -> anyhow::Result<()> {
        let index = self.index()?;
        if index.is_empty() {
            return Err(Error::EmptyIndex.into());
        }

        let tree_id = Tree::build(&index, self.database())?;
        info!(oid = %tree_id, entries = index.len(), "wrote tree");

        writeln!(self.writer(), "{tree_id}")?;

        Ok(())
    }
}
