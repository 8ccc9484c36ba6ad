//! Hash partitioning of tile keys.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use super::layout::TileKey;
use crate::error::{MusaError, Result};

/// Spreads tile keys over a fixed number of partitions by key hash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashPartitionStrategy {
    num_partitions: usize,
}

impl HashPartitionStrategy {
    pub fn new(num_partitions: usize) -> Result<Self> {
        if num_partitions == 0 {
            return Err(MusaError::InvalidParameter {
                param: "num_partitions".to_string(),
                message: "Partition count must be at least 1".to_string(),
            });
        }
        Ok(Self { num_partitions })
    }

    pub fn num_partitions(&self) -> usize {
        self.num_partitions
    }

    /// The partition a key belongs to; stable across runs
    pub fn partition_for(&self, key: &TileKey) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() % self.num_partitions as u64) as usize
    }

    /// Group keys by partition; the result always has `num_partitions` entries
    pub fn partition(&self, keys: impl IntoIterator<Item = TileKey>) -> Vec<Vec<TileKey>> {
        let mut partitions = vec![Vec::new(); self.num_partitions];
        for key in keys {
            partitions[self.partition_for(&key)].push(key);
        }
        partitions
    }
}
