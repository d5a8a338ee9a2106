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

//! # Ballast Agents
//!
//! The per-frame state machines of the resource governor:
//!
//! - [`loading_agent`]: serializes resource-set load requests, one in flight.
//! - [`memory_agent`]: edge-triggered memory ceilings and the reclamation
//!   cascade they fire.
//! - [`governor`]: the owned entry point ticked once per frame.
//!
//! Everything here runs on a single tick thread. Loader results cross threads
//! only through [`LoadTicket`](ballast_core::LoadTicket) channels and are
//! applied on the next tick.

#![warn(missing_docs)]

pub mod governor;
pub mod loading_agent;
pub mod memory_agent;

pub use governor::{Collaborators, Governor};
pub use loading_agent::LoadQueue;
pub use memory_agent::{
    MemoryOverlay, MemoryTier, ReclaimTargets, ReclamationCascade, ThresholdEdges,
    ThresholdMonitor, ThresholdState, TierPolicy,
};
