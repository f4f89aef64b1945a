//! Utility functions and types

pub mod data_loader;

pub use data_loader::{ColumnInfo, DataLoader, DataSaver, FileInfo};

use sha2::{Digest, Sha256};

/// Compute SHA-256 hash of data as lowercase hex
pub fn compute_sha256(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
