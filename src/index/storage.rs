//! Binary storage for the vector artifact.
//!
//! Vectors are written as one contiguous little-endian f32 matrix in
//! catalog order, preceded by a fixed header. Row `i` of the matrix is the
//! embedding of catalog record `i`.
//!
//! # Storage Format
//!
//! - Magic bytes: `AVEC` (4 bytes)
//! - Format version: u32 LE (4 bytes)
//! - Similarity metric: u8, 1 = inner product (1 byte)
//! - Dimension: u32 LE (4 bytes)
//! - Vector count: u32 LE (4 bytes)
//! - Payload: count * dimension f32 values, little-endian

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use memmap2::MmapOptions;
use thiserror::Error;

/// File name inside the index directory.
pub const VECTORS_FILE: &str = "vectors.bin";

/// Current storage format version.
const STORAGE_VERSION: u32 = 1;

/// Size of the storage header in bytes.
const HEADER_SIZE: usize = 17;

/// Magic bytes to identify vector artifact files.
const MAGIC_BYTES: &[u8; 4] = b"AVEC";

/// Similarity metric marker for inner-product search.
const METRIC_INNER_PRODUCT: u8 = 1;

/// Number of bytes per f32 value.
const BYTES_PER_F32: usize = 4;

/// Errors specific to vector storage operations.
#[derive(Error, Debug)]
pub enum VectorStorageError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid storage format: {0}")]
    InvalidFormat(String),

    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Vector matrix read back from disk.
#[derive(Debug)]
pub struct StoredVectors {
    pub dimension: usize,
    pub count: usize,
    /// Row-major matrix, `count * dimension` values
    pub data: Vec<f32>,
}

/// Write the vector matrix into `dir` as `vectors.bin`.
///
/// Every row must have exactly `dimension` values.
pub fn write_vectors(
    dir: &Path,
    dimension: usize,
    vectors: &[Vec<f32>],
) -> Result<(), VectorStorageError> {
    for vector in vectors {
        if vector.len() != dimension {
            return Err(VectorStorageError::DimensionMismatch {
                expected: dimension,
                actual: vector.len(),
            });
        }
    }

    let mut bytes = Vec::with_capacity(HEADER_SIZE + vectors.len() * dimension * BYTES_PER_F32);
    bytes.extend_from_slice(MAGIC_BYTES);
    bytes.extend_from_slice(&STORAGE_VERSION.to_le_bytes());
    bytes.push(METRIC_INNER_PRODUCT);
    bytes.extend_from_slice(&(dimension as u32).to_le_bytes());
    bytes.extend_from_slice(&(vectors.len() as u32).to_le_bytes());

    for vector in vectors {
        for &value in vector {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
    }

    let mut file = File::create(dir.join(VECTORS_FILE))?;
    file.write_all(&bytes)?;
    file.flush()?;
    Ok(())
}

/// Read the vector matrix from `dir`.
///
/// The file is memory-mapped for the read and validated against its own
/// header before any payload is copied out. Truncated or padded payloads
/// are rejected rather than read partially.
pub fn read_vectors(dir: &Path) -> Result<StoredVectors, VectorStorageError> {
    let path = dir.join(VECTORS_FILE);
    let file = File::open(&path)?;
    let mmap = unsafe { MmapOptions::new().map(&file)? };

    if mmap.len() < HEADER_SIZE {
        return Err(VectorStorageError::InvalidFormat(
            "File too small to contain header".to_string(),
        ));
    }

    if &mmap[0..4] != MAGIC_BYTES {
        return Err(VectorStorageError::InvalidFormat(
            "Invalid magic bytes".to_string(),
        ));
    }

    let version = u32::from_le_bytes([mmap[4], mmap[5], mmap[6], mmap[7]]);
    if version != STORAGE_VERSION {
        return Err(VectorStorageError::InvalidFormat(format!(
            "Unsupported storage version {version}, expected {STORAGE_VERSION}"
        )));
    }

    let metric = mmap[8];
    if metric != METRIC_INNER_PRODUCT {
        return Err(VectorStorageError::InvalidFormat(format!(
            "Unsupported similarity metric {metric}, expected {METRIC_INNER_PRODUCT}"
        )));
    }

    let dimension = u32::from_le_bytes([mmap[9], mmap[10], mmap[11], mmap[12]]) as usize;
    let count = u32::from_le_bytes([mmap[13], mmap[14], mmap[15], mmap[16]]) as usize;

    if dimension == 0 && count > 0 {
        return Err(VectorStorageError::InvalidFormat(
            "Zero dimension with non-zero vector count".to_string(),
        ));
    }

    let payload_len = count
        .checked_mul(dimension)
        .and_then(|values| values.checked_mul(BYTES_PER_F32))
        .ok_or_else(|| {
            VectorStorageError::InvalidFormat("Header declares an impossible payload size".to_string())
        })?;

    let expected_len = HEADER_SIZE + payload_len;
    if mmap.len() != expected_len {
        return Err(VectorStorageError::InvalidFormat(format!(
            "Expected {} bytes for {} vectors of dimension {}, found {}",
            expected_len,
            count,
            dimension,
            mmap.len()
        )));
    }

    let mut data = Vec::with_capacity(count * dimension);
    for chunk in mmap[HEADER_SIZE..].chunks_exact(BYTES_PER_F32) {
        data.push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }

    Ok(StoredVectors {
        dimension,
        count,
        data,
    })
}

/// Check if a vector artifact exists in `dir`.
pub fn vectors_exist(dir: &Path) -> bool {
    dir.join(VECTORS_FILE).exists()
}
