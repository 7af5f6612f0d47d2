//! # Partitioner
//!
//! Pure splitting of an ordered collection into fixed-size partitions. The
//! only algorithmic property is order preservation: the item at global index
//! `i` lands in partition `i / size` at local index `i % size`, so flattening
//! the output reproduces the input exactly.

use crate::error::{DispatchError, Result};

/// Split `items` into partitions of at most `size` items each, preserving
/// the input order within and across partitions.
///
/// Every partition except possibly the last has length exactly `size`. An
/// empty input produces zero partitions, never one empty partition.
///
/// # Errors
///
/// Returns [`DispatchError::InvalidArgument`] when `size` is zero.
pub fn partition<T>(items: Vec<T>, size: usize) -> Result<Vec<Vec<T>>> {
    if size == 0 {
        return Err(DispatchError::InvalidArgument(
            "partition size must be at least 1".to_string(),
        ));
    }

    let mut partitions = Vec::with_capacity(items.len().div_ceil(size));
    let mut current = Vec::with_capacity(size.min(items.len()));

    for item in items {
        current.push(item);
        if current.len() == size {
            partitions.push(std::mem::replace(&mut current, Vec::with_capacity(size)));
        }
    }

    if !current.is_empty() {
        partitions.push(current);
    }

    Ok(partitions)
}
