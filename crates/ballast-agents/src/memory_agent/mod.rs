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

//! Acts as the agent for memory pressure.
//!
//! Two [`ThresholdMonitor`]s (total memory and heap memory) sample the process
//! every frame. Each has a soft ceiling (a fraction of its limit) and a hard
//! ceiling (the limit), and reacts only on the frame a ceiling is crossed
//! upwards. The reaction is a [`ReclamationCascade`] run and/or a logged alert.

mod cascade;
mod overlay;
mod threshold;

pub use self::cascade::{ReclaimTargets, ReclamationCascade};
pub use self::overlay::MemoryOverlay;
pub use self::threshold::{
    MemoryTier, ThresholdEdges, ThresholdMonitor, ThresholdState, TierPolicy,
};
