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

//! # Ballast Core
//!
//! Foundational crate containing the types, collaborator traits, and
//! configuration shared by the frame resource governor.
//!
//! Nothing in here owns a frame loop. Higher-level crates (`ballast-agents`)
//! drive the state machines, and `ballast-telemetry` supplies concrete
//! implementations of the collaborator traits.

#![warn(missing_docs)]

pub mod config;
pub mod event;
pub mod loading;
pub mod memory;
pub mod reclaim;

pub use config::{AppMode, ConfigError, GovernorConfig};
pub use event::{MemoryEvent, MemoryEventDispatcher, MemoryEventListener};
pub use loading::{
    BundleLoader, DeliveryMode, DeliveryModeQuery, LoadCompletion, LoadState, LoadTicket,
    ProgressCallback, ResourceKey,
};
pub use memory::{bytes_to_mb, MemorySnapshot, MetricSource};
pub use reclaim::{ReclaimLevel, Reclaimable};
