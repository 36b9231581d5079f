use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::error::Error;
use bytes::Bytes;
use tracing::info;

impl Repository {
    /// Record `tree_id` as a commit on top of `parents` and print the commit id
    pub fn commit_tree(
        &mut self,
        tree_id: &str,
        parents: &[String],
        message: Bytes,
    ) -> anyhow::Result<()> {
        let tree_id = ObjectId::try_parse(tree_id)?;
        let parents = parents
            .iter()
            .map(|parent| ObjectId::try_parse(parent))
            .collect::<crate::Result<Vec<_>>>()?;

        let commit = Commit::new(
            tree_id,
            parents,
            self.config().author().clone(),
            self.config().committer().clone(),
            message,
        )?;

        self.expect_type(commit.tree_oid(), ObjectType::Tree)?;
        for parent in commit.parents() {
            self.expect_type(parent, ObjectType::Commit)?;
        }

        let commit_id = self.database().store(&commit)?;
        info!(oid = %commit_id, tree = %tree_id, "wrote commit");

        writeln!(self.writer(), "{commit_id}")?;

        Ok(())
    }

    fn expect_type(&self, object_id: &ObjectId, expected: ObjectType) -> crate::Result<()> {
        let object = self.database().get(object_id)?;

        if object.object_type != expected {
            return Err(Error::WrongType {
                id: *object_id,
                expected,
                actual: object.object_type,
            });
        }

        Ok(())
    }
}
