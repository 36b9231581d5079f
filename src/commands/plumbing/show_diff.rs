use crate::areas::repository::Repository;
use crate::artifacts::index::index_entry::EntryMetadata;
use anyhow::Context;
use std::io::ErrorKind;

impl Repository {
    /// Compare every staged entry with the file currently on disk
    ///
    /// Prints `<path>: ok` for untouched files, otherwise the staged content
    /// id and the changed metadata fields.
    pub fn show_diff(&mut self) -> anyhow::Result<()> {
        let index = self.index()?;

        for entry in index.entries() {
            let file_path = self.workdir_path(&entry.name);

            let metadata = match std::fs::metadata(&file_path) {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    writeln!(self.writer(), "{}: {} [deleted]", entry.name.display(), entry.oid)?;
                    continue;
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("unable to stat {}", entry.name.display()));
                }
            };

            let changes = entry.stat_changes(&EntryMetadata::from(&metadata));
            if changes.is_empty() {
                writeln!(self.writer(), "{}: ok", entry.name.display())?;
            } else {
                writeln!(
                    self.writer(),
                    "{}: {} [{}]",
                    entry.name.display(),
                    entry.oid,
                    changes
                )?;
            }
        }

        Ok(())
    }
}
