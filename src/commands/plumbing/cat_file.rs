use crate::areas::repository::Repository;
use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;

impl Repository {
    /// Print an object's type and size, and with `pretty` its content
    ///
    /// Tree records are listed the way `read-tree` lists them; blob and
    /// commit payloads are written out byte for byte.
    pub fn cat_file(&mut self, object_id: &str, pretty: bool) -> anyhow::Result<()> {
        let object_id = ObjectId::try_parse(object_id)?;
        let object = self.database().get(&object_id)?;

        writeln!(
            self.writer(),
            "{} {}",
            object.object_type,
            object.payload.len()
        )?;

        if !pretty {
            return Ok(());
        }

        match object.object_type {
            ObjectType::Tree => {
                let tree = Tree::deserialize(object.payload)?;
                for entry in tree.entries() {
                    writeln!(
                        self.writer(),
                        "{} {}\t{}",
                        entry.mode,
                        entry.oid,
                        entry.name.display()
                    )?;
                }
            }
            ObjectType::Blob | ObjectType::Commit => {
                self.writer().write_all(&object.payload)?;
            }
        }

        Ok(())
    }
}
