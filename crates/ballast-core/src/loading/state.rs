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

use serde::{Deserialize, Serialize};

/// Progress of a batch of resource loads, as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LoadState {
    /// Fraction of the batch dispatched so far, in `[0, 1]`.
    pub progress: f32,
    /// `true` once every request in the batch has finished.
    pub is_done: bool,
}

impl LoadState {
    /// The canonical "everything finished" state.
    pub const COMPLETE: LoadState = LoadState {
        progress: 1.0,
        is_done: true,
    };

    /// Creates an unfinished state, clamping `progress` into `[0, 1]`.
    pub fn in_progress(progress: f32) -> Self {
        Self {
            progress: progress.clamp(0.0, 1.0),
            is_done: false,
        }
    }

    /// Returns `true` if this is a finished state.
    pub fn is_complete(&self) -> bool {
        self.is_done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn in_progress_is_clamped() {
        assert_relative_eq!(LoadState::in_progress(1.7).progress, 1.0);
        assert_relative_eq!(LoadState::in_progress(-0.2).progress, 0.0);
        assert!(!LoadState::in_progress(0.5).is_done);
    }

    #[test]
    fn complete_sentinel_is_done() {
        assert!(LoadState::COMPLETE.is_complete());
        assert_relative_eq!(LoadState::COMPLETE.progress, 1.0);
        assert!(!LoadState::default().is_complete());
    }
}
