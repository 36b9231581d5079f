use crate::artifacts::core::cursor::ByteCursor;
use crate::artifacts::index::{CHECKSUM_SIZE, HEADER_SIZE, SIGNATURE, VERSION};
use crate::error::{Error, Result};
use byteorder::{ByteOrder, LittleEndian};
use bytes::Bytes;
use derive_new::new;

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct IndexHeader {
    pub signature: [u8; 4],
    pub version: u32,
    pub entries_count: u32,
    pub checksum: [u8; CHECKSUM_SIZE],
}

impl IndexHeader {
    pub fn empty() -> Self {
        IndexHeader {
            signature: SIGNATURE,
            version: VERSION,
            entries_count: 0,
            checksum: [0; CHECKSUM_SIZE],
        }
    }

    /// The fields covered by the checksum: `signature ‖ version ‖ entry_count`
    pub fn checksummed_fields(&self) -> Vec<u8> {
        let mut bytes = vec![0u8; HEADER_SIZE - CHECKSUM_SIZE];
        bytes[0..4].copy_from_slice(&self.signature);
        LittleEndian::write_u32(&mut bytes[4..8], self.version);
        LittleEndian::write_u32(&mut bytes[8..12], self.entries_count);
        bytes
    }

    pub fn serialize(&self) -> Bytes {
        let mut bytes = self.checksummed_fields();
        bytes.extend_from_slice(&self.checksum);
        Bytes::from(bytes)
    }

    /// Decode the fixed 32-byte header region without validating it
    pub fn parse(cursor: &mut ByteCursor) -> Result<Self> {
        if cursor.remaining() < HEADER_SIZE {
            return Err(Error::Corrupt(format!(
                "index header needs {HEADER_SIZE} bytes, file holds {}",
                cursor.remaining()
            )));
        }

        let signature = cursor.read_bytes(4)?;
        let version = cursor.read_u32_le()?;
        let entries_count = cursor.read_u32_le()?;
        let checksum = cursor.read_bytes(CHECKSUM_SIZE)?;

        let mut header = IndexHeader::empty();
        header.signature.copy_from_slice(&signature);
        header.version = version;
        header.entries_count = entries_count;
        header.checksum.copy_from_slice(&checksum);

        Ok(header)
    }

    pub fn validate(&self) -> Result<()> {
        if self.signature != SIGNATURE {
            return Err(Error::Corrupt(format!(
                "invalid index signature {:?}",
                String::from_utf8_lossy(&self.signature)
            )));
        }

        if self.version != VERSION {
            return Err(Error::Corrupt(format!(
                "unsupported index version {}",
                self.version
            )));
        }

        Ok(())
    }
}
