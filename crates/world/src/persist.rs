//! Block-entity record persistence with zstd compression.
//!
//! A store file holds every saved block-entity record of a world, keyed by
//! block position. The payload is bincode, compressed with zstd and guarded
//! by a CRC32 over the compressed bytes.

use anyhow::{Context, Result};
use crc32fast::Hasher;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use traincraft_core::{BlockPos, Compound};

/// Magic number for store files ("TCBE" = traincraft block entities).
const STORE_MAGIC: u32 = 0x5443_4245;

/// Current store file format version.
const STORE_VERSION: u16 = 1;

const HEADER_LEN: usize = 14;

/// File name used inside a world directory.
pub const STORE_FILE_NAME: &str = "block_entities.tcbe";

/// Records keyed by the position of their block.
pub type BlockEntityRecords = BTreeMap<BlockPos, Compound>;

#[derive(Debug, Clone)]
struct StoreHeader {
    magic: u32,
    version: u16,
    crc32: u32,
    payload_len: u32,
}

impl StoreHeader {
    fn new(crc32: u32, payload_len: u32) -> Self {
        Self {
            magic: STORE_MAGIC,
            version: STORE_VERSION,
            crc32,
            payload_len,
        }
    }

    fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut bytes = [0u8; HEADER_LEN];
        bytes[0..4].copy_from_slice(&self.magic.to_le_bytes());
        bytes[4..6].copy_from_slice(&self.version.to_le_bytes());
        bytes[6..10].copy_from_slice(&self.crc32.to_le_bytes());
        bytes[10..14].copy_from_slice(&self.payload_len.to_le_bytes());
        bytes
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            anyhow::bail!("Store header too short");
        }

        let magic = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        if magic != STORE_MAGIC {
            anyhow::bail!(
                "Invalid store magic: expected 0x{:08X}, got 0x{:08X}",
                STORE_MAGIC,
                magic
            );
        }

        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version > STORE_VERSION {
            anyhow::bail!("Unsupported store version {version}");
        }
        let crc32 = u32::from_le_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]);
        let payload_len = u32::from_le_bytes([bytes[10], bytes[11], bytes[12], bytes[13]]);

        Ok(Self {
            magic,
            version,
            crc32,
            payload_len,
        })
    }
}

/// Encode records into the on-disk byte layout.
pub fn encode_records(records: &BlockEntityRecords) -> Result<Vec<u8>> {
    let entries: Vec<(&BlockPos, &Compound)> = records.iter().collect();
    let serialized = bincode::serialize(&entries).context("Failed to serialize records")?;

    // Level 3 matches the zstd default.
    let compressed = zstd::encode_all(&serialized[..], 3).context("Failed to compress records")?;

    let mut hasher = Hasher::new();
    hasher.update(&compressed);
    let payload_len = u32::try_from(compressed.len()).context("Store payload too large")?;
    let header = StoreHeader::new(hasher.finalize(), payload_len);

    let mut bytes = Vec::with_capacity(HEADER_LEN + compressed.len());
    bytes.extend_from_slice(&header.to_bytes());
    bytes.extend_from_slice(&compressed);
    Ok(bytes)
}

/// Decode records from the on-disk byte layout.
pub fn decode_records(bytes: &[u8]) -> Result<BlockEntityRecords> {
    let header = StoreHeader::from_bytes(bytes)?;
    let payload = &bytes[HEADER_LEN..];
    if payload.len() != header.payload_len as usize {
        anyhow::bail!(
            "Store payload length mismatch: header says {}, found {}",
            header.payload_len,
            payload.len()
        );
    }

    let mut hasher = Hasher::new();
    hasher.update(payload);
    let computed_crc = hasher.finalize();
    if computed_crc != header.crc32 {
        anyhow::bail!(
            "CRC32 mismatch: expected {:08X}, got {:08X}",
            header.crc32,
            computed_crc
        );
    }

    let decompressed = zstd::decode_all(payload).context("Failed to decompress records")?;
    let entries: Vec<(BlockPos, Compound)> =
        bincode::deserialize(&decompressed).context("Failed to deserialize records")?;
    Ok(entries.into_iter().collect())
}

/// File-backed store for block-entity records.
pub struct BlockEntityStore {
    path: PathBuf,
}

impl BlockEntityStore {
    /// Create a store rooted at the given world directory.
    pub fn new<P: AsRef<Path>>(world_dir: P) -> Result<Self> {
        let world_dir = world_dir.as_ref();
        fs::create_dir_all(world_dir).context("Failed to create world directory")?;
        Ok(Self {
            path: world_dir.join(STORE_FILE_NAME),
        })
    }

    /// Path of the store file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a store file has been written.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Replace the stored records.
    pub fn save(&self, records: &BlockEntityRecords) -> Result<()> {
        let bytes = encode_records(records)?;
        let mut file = File::create(&self.path).context("Failed to create store file")?;
        file.write_all(&bytes).context("Failed to write store file")?;
        tracing::debug!(path = %self.path.display(), count = records.len(), "saved block entities");
        Ok(())
    }

    /// Load every stored record. A missing file loads as empty.
    pub fn load(&self) -> Result<BlockEntityRecords> {
        if !self.exists() {
            return Ok(BlockEntityRecords::new());
        }
        let mut bytes = Vec::new();
        File::open(&self.path)
            .context("Failed to open store file")?
            .read_to_end(&mut bytes)
            .context("Failed to read store file")?;
        decode_records(&bytes).with_context(|| format!("Corrupt store {}", self.path.display()))
    }
}
