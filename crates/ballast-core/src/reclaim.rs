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

//! Targets of the reclamation cascade.

use serde::{Deserialize, Serialize};

/// Something that can release cached memory on request.
///
/// Object pools, hidden UI, and data/config/record caches all implement this.
/// The governor does not verify that memory was actually returned; an `Err`
/// is logged and the cascade moves on to the next target.
pub trait Reclaimable: Send {
    /// Releases whatever this target can release.
    fn reclaim(&mut self) -> anyhow::Result<()>;
}

impl<F> Reclaimable for F
where
    F: FnMut() -> anyhow::Result<()> + Send,
{
    fn reclaim(&mut self) -> anyhow::Result<()> {
        self()
    }
}

/// How far a reclamation goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReclaimLevel {
    /// Object pool, hidden UI, then every heap cache.
    Full,
    /// Data, config, and record caches only.
    Heap,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_reclaimable() {
        let mut calls = 0;
        {
            let mut target = || -> anyhow::Result<()> {
                calls += 1;
                Ok(())
            };
            target.reclaim().unwrap();
            target.reclaim().unwrap();
        }
        assert_eq!(calls, 2);
    }
}
