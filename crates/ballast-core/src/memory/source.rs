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

/// Number of bytes in one megabyte, as used by every memory ceiling.
pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Converts a byte count to megabytes (`bytes / (1024 * 1024)`).
pub fn bytes_to_mb(bytes: u64) -> f32 {
    (bytes as f64 / BYTES_PER_MB) as f32
}

/// Read-only memory counters for the running process.
///
/// Implementations may cache their readings; [`MetricSource::refresh`] is
/// called once per tick before any of the getters.
pub trait MetricSource: Send + Sync {
    /// Bytes currently in use by the whole process.
    fn total_allocated_bytes(&self) -> u64;

    /// Bytes the process has reserved from the OS. Never below the allocated figure.
    fn total_reserved_bytes(&self) -> u64;

    /// Bytes in use on the managed heap.
    fn heap_used_bytes(&self) -> u64;

    /// Current capacity of the managed heap.
    fn heap_capacity_bytes(&self) -> u64;

    /// Updates cached readings. Default: no-op, for sources that read live.
    fn refresh(&self) {}
}

/// All four memory metrics for one frame, in megabytes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MemorySnapshot {
    /// See [`MetricSource::total_allocated_bytes`].
    pub total_allocated_mb: f32,
    /// See [`MetricSource::total_reserved_bytes`].
    pub total_reserved_mb: f32,
    /// See [`MetricSource::heap_used_bytes`].
    pub heap_used_mb: f32,
    /// See [`MetricSource::heap_capacity_bytes`].
    pub heap_capacity_mb: f32,
}

impl MemorySnapshot {
    /// Reads every metric of `source` once.
    pub fn capture(source: &dyn MetricSource) -> Self {
        Self {
            total_allocated_mb: bytes_to_mb(source.total_allocated_bytes()),
            total_reserved_mb: bytes_to_mb(source.total_reserved_bytes()),
            heap_used_mb: bytes_to_mb(source.heap_used_bytes()),
            heap_capacity_mb: bytes_to_mb(source.heap_capacity_bytes()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    struct FixedSource;

    impl MetricSource for FixedSource {
        fn total_allocated_bytes(&self) -> u64 {
            64 * 1024 * 1024
        }
        fn total_reserved_bytes(&self) -> u64 {
            96 * 1024 * 1024
        }
        fn heap_used_bytes(&self) -> u64 {
            512 * 1024
        }
        fn heap_capacity_bytes(&self) -> u64 {
            0
        }
    }

    #[test]
    fn bytes_to_mb_uses_binary_megabytes() {
        assert_relative_eq!(bytes_to_mb(1024 * 1024), 1.0);
        assert_relative_eq!(bytes_to_mb(3 * 512 * 1024), 1.5);
        assert_relative_eq!(bytes_to_mb(0), 0.0);
    }

    #[test]
    fn snapshot_converts_every_metric() {
        let snapshot = MemorySnapshot::capture(&FixedSource);
        assert_relative_eq!(snapshot.total_allocated_mb, 64.0);
        assert_relative_eq!(snapshot.total_reserved_mb, 96.0);
        assert_relative_eq!(snapshot.heap_used_mb, 0.5);
        assert_relative_eq!(snapshot.heap_capacity_mb, 0.0);
    }
}
