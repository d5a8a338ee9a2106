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

use ballast_core::MemorySnapshot;

/// The two lines shown by the on-screen memory debug overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryOverlay {
    /// Total memory line, e.g. `Total memory: 123.45M`.
    pub total: String,
    /// Heap memory line, e.g. `Heap memory: 12.00M`.
    pub heap: String,
}

impl MemoryOverlay {
    /// Formats the overlay lines from a snapshot.
    pub fn from_snapshot(snapshot: &MemorySnapshot) -> Self {
        Self {
            total: format!("Total memory: {:.2}M", snapshot.total_allocated_mb),
            heap: format!("Heap memory: {:.2}M", snapshot.heap_used_mb),
        }
    }

    /// Both lines, top to bottom.
    pub fn lines(&self) -> [&str; 2] {
        [&self.total, &self.heap]
    }
}
