use crate::artifacts::index::CHECKSUM_SIZE;
use crate::error::{Error, Result};
use sha1::{Digest, Sha1};

/// Running SHA-1 over the header fields and every encoded entry
///
/// The digest covers `signature ‖ version ‖ entry_count ‖ entry_bytes*` and
/// is stored in the header, so it is computed before the file is written and
/// recomputed after the whole file has been read.
#[derive(Debug, Clone, Default)]
pub struct Checksum {
    digest: Sha1,
}

impl Checksum {
    pub fn new() -> Self {
        Checksum {
            digest: Sha1::new(),
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        self.digest.update(data);
    }

    pub fn finish(&self) -> [u8; CHECKSUM_SIZE] {
        self.digest.clone().finalize().into()
    }

    pub fn verify(&self, expected: &[u8; CHECKSUM_SIZE]) -> Result<()> {
        if &self.finish() != expected {
            return Err(Error::Corrupt(
                "index checksum does not match value stored on disk".to_string(),
            ));
        }

        Ok(())
    }
}
