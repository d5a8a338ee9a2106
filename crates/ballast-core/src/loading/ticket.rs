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

use crossbeam_channel::Sender;

use super::{LoadState, ResourceKey};

/// A load result travelling from the bundle loader back to the tick thread.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadCompletion {
    /// The request this result belongs to.
    pub key: ResourceKey,
    /// Dispatch number of the request, unique per queue.
    pub generation: u64,
    /// The state reported by the loader.
    pub state: LoadState,
}

/// The handle a [`BundleLoader`](super::BundleLoader) uses to report on one request.
///
/// Tickets are `Send`; a multi-threaded loader may move them to a worker. The
/// reports are queued and only applied when the governor next ticks, so the
/// queue state is never touched off the tick thread.
///
/// Each ticket is stamped with the dispatch it was issued for. Reports from a
/// ticket whose dispatch is no longer in flight are discarded by the queue,
/// even when the same key has been dispatched again since.
#[derive(Debug)]
pub struct LoadTicket {
    key: ResourceKey,
    generation: u64,
    sender: Sender<LoadCompletion>,
}

impl LoadTicket {
    /// Creates a ticket for dispatch `generation`, reporting into `sender`.
    pub fn new(
        key: impl Into<ResourceKey>,
        generation: u64,
        sender: Sender<LoadCompletion>,
    ) -> Self {
        Self {
            key: key.into(),
            generation,
            sender,
        }
    }

    /// The key of the request this ticket belongs to.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The dispatch this ticket was issued for.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Reports an intermediate or final state for the request.
    pub fn report(&self, state: LoadState) {
        let completion = LoadCompletion {
            key: self.key.clone(),
            generation: self.generation,
            state,
        };
        if self.sender.send(completion).is_err() {
            log::debug!(
                "Load queue is gone, dropping report for bundle '{}'.",
                self.key
            );
        }
    }

    /// Marks the request as finished.
    pub fn finish(self) {
        self.report(LoadState::COMPLETE);
    }
}
