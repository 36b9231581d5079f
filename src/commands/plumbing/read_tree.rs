use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Tree;

impl Repository {
    /// Print one `<mode> <id>\t<name>` line per tree record
    pub fn read_tree(&mut self, tree_id: &str) -> anyhow::Result<()> {
        let tree_id = ObjectId::try_parse(tree_id)?;

        for entry in Tree::parse(self.database(), &tree_id)? {
            let entry = entry?;
            writeln!(
                self.writer(),
                "{} {}\t{}",
                entry.mode,
                entry.oid,
                entry.name.display()
            )?;
        }

        Ok(())
    }
}
