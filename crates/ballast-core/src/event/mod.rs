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

//! Memory pressure notifications.
//!
//! Before the reclamation cascade clears any cache it announces what it is
//! about to do through a [`MemoryEventDispatcher`]. Listeners are called
//! synchronously, so a subsystem can flush or snapshot state before the
//! corresponding clears run.

mod dispatcher;

pub use self::dispatcher::{MemoryEventDispatcher, MemoryEventListener};

use std::fmt;

/// The kinds of memory pressure notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryEvent {
    /// Every reclaimable cache is about to be released.
    FreeMemory,
    /// Only heap-resident data caches are about to be released.
    FreeHeapMemory,
}

impl fmt::Display for MemoryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryEvent::FreeMemory => f.write_str("free-memory"),
            MemoryEvent::FreeHeapMemory => f.write_str("free-heap-memory"),
        }
    }
}
