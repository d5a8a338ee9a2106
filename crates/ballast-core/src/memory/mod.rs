// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Process memory accounting.
//!
//! This module defines the global heap counters maintained by a tracking
//! allocator (see `ballast-telemetry`), and the [`MetricSource`] contract the
//! threshold monitors sample every frame. If no tracking allocator is
//! registered the counters simply stay at zero.

mod source;

pub use self::source::{bytes_to_mb, MemorySnapshot, MetricSource, BYTES_PER_MB};

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Bytes currently held by the registered tracking allocator.
pub static CURRENTLY_ALLOCATED_BYTES: AtomicUsize = AtomicUsize::new(0);

/// High-water mark of [`CURRENTLY_ALLOCATED_BYTES`].
pub static PEAK_ALLOCATED_BYTES: AtomicU64 = AtomicU64::new(0);

/// Number of allocation calls made.
pub static TOTAL_ALLOCATIONS: AtomicU64 = AtomicU64::new(0);

/// Number of deallocation calls made.
pub static TOTAL_DEALLOCATIONS: AtomicU64 = AtomicU64::new(0);

/// A snapshot of the global heap counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeapStats {
    /// Bytes currently allocated.
    pub current_bytes: usize,
    /// Peak bytes allocated at once.
    pub peak_bytes: u64,
    /// Allocation calls so far.
    pub total_allocations: u64,
    /// Deallocation calls so far.
    pub total_deallocations: u64,
}

/// Reads all heap counters (`Ordering::Relaxed`).
pub fn heap_stats() -> HeapStats {
    HeapStats {
        current_bytes: CURRENTLY_ALLOCATED_BYTES.load(Ordering::Relaxed),
        peak_bytes: PEAK_ALLOCATED_BYTES.load(Ordering::Relaxed),
        total_allocations: TOTAL_ALLOCATIONS.load(Ordering::Relaxed),
        total_deallocations: TOTAL_DEALLOCATIONS.load(Ordering::Relaxed),
    }
}
