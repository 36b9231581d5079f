use crate::artifacts::index::index_entry::EntryMetadata;
use bitflags::bitflags;

bitflags! {
    /// Which parts of a file's metadata differ from what was staged
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StatChange: u32 {
        const MTIME = 0x0001;
        const CTIME = 0x0002;
        const OWNER = 0x0004;
        const MODE = 0x0008;
        const INODE = 0x0010;
        const DATA = 0x0020;
    }
}

impl StatChange {
    pub fn between(staged: &EntryMetadata, current: &EntryMetadata) -> Self {
        let mut changes = Self::empty();

        if staged.mtime != current.mtime {
            changes |= Self::MTIME;
        }
        if staged.ctime != current.ctime {
            changes |= Self::CTIME;
        }
        if staged.uid != current.uid || staged.gid != current.gid {
            changes |= Self::OWNER;
        }
        if staged.mode != current.mode {
            changes |= Self::MODE;
        }
        if staged.dev != current.dev || staged.ino != current.ino {
            changes |= Self::INODE;
        }
        if staged.size != current.size {
            changes |= Self::DATA;
        }

        changes
    }
}

impl std::fmt::Display for StatChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names = self
            .iter_names()
            .map(|(name, _)| name.to_lowercase())
            .collect::<Vec<_>>();

        write!(f, "{}", names.join(","))
    }
}
