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

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use ballast_core::{
    BundleLoader, DeliveryModeQuery, LoadCompletion, LoadState, LoadTicket, ProgressCallback,
    ResourceKey,
};
use crossbeam_channel::{Receiver, Sender};

/// FIFO of pending resource-set loads with at most one request in flight.
///
/// A request leaves the queue the moment it is dispatched. The in-flight slot
/// is released only when the loader reports the request done through its
/// [`LoadTicket`]; the report is picked up on the next [`advance`](Self::advance).
///
/// Every dispatch gets a fresh generation number. Reports are matched on it
/// rather than on the key, so a stale ticket for an abandoned or earlier load
/// of the same bundle can never free the slot of the current one.
///
/// All callbacks registered before the queue drains share one batch: they all
/// see the same progress values and a single final [`LoadState::COMPLETE`].
pub struct LoadQueue {
    delivery: Arc<dyn DeliveryModeQuery>,
    loader: Box<dyn BundleLoader>,
    pending: VecDeque<ResourceKey>,
    in_flight: Option<InFlight>,
    next_generation: u64,
    total_requested: usize,
    callbacks: Vec<ProgressCallback>,
    completion_tx: Sender<LoadCompletion>,
    completion_rx: Receiver<LoadCompletion>,
    last_state: LoadState,
}

impl LoadQueue {
    /// Creates an empty queue dispatching to `loader`.
    pub fn new(delivery: Arc<dyn DeliveryModeQuery>, loader: Box<dyn BundleLoader>) -> Self {
        let (completion_tx, completion_rx) = crossbeam_channel::unbounded();
        Self {
            delivery,
            loader,
            pending: VecDeque::new(),
            in_flight: None,
            next_generation: 0,
            total_requested: 0,
            callbacks: Vec::new(),
            completion_tx,
            completion_rx,
            last_state: LoadState::COMPLETE,
        }
    }

    /// Queues `requests` and registers `on_progress` for the current batch.
    ///
    /// When the active delivery mode does not stream bundles, or when an empty
    /// batch is submitted to an idle queue, `on_progress` is called once with
    /// [`LoadState::COMPLETE`] before this returns and nothing is queued.
    pub fn submit<I, K, F>(&mut self, requests: I, on_progress: F)
    where
        I: IntoIterator<Item = K>,
        K: Into<ResourceKey>,
        F: FnMut(LoadState) -> anyhow::Result<()> + Send + 'static,
    {
        let mut callback: ProgressCallback = Box::new(on_progress);

        if !self.delivery.delivery_mode().requires_streaming() {
            log::debug!("Resources are embedded; completing load request immediately.");
            invoke_guarded(&mut callback, LoadState::COMPLETE);
            return;
        }

        let requests: Vec<ResourceKey> = requests.into_iter().map(Into::into).collect();
        if requests.is_empty() && self.is_idle() {
            log::debug!("Empty load request on an idle queue; completing immediately.");
            invoke_guarded(&mut callback, LoadState::COMPLETE);
            return;
        }

        log::info!(
            "Queued {} resource set(s) ({} already pending).",
            requests.len(),
            self.pending.len()
        );
        self.total_requested += requests.len();
        self.pending.extend(requests);
        self.callbacks.push(callback);
    }

    /// Unloads the bundles behind `requests`. No-op when resources are embedded.
    pub fn release<I, K>(&mut self, requests: I)
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        if !self.delivery.delivery_mode().requires_streaming() {
            return;
        }
        for key in requests {
            let key = key.as_ref();
            log::debug!("Unloading bundle '{key}'.");
            self.loader.unload(key);
        }
    }

    /// Runs one frame of the queue.
    ///
    /// Applies loader reports received since the last frame, then, if nothing
    /// is in flight, either dispatches the next request or, once the queue has
    /// drained, delivers the final completion to the batch callbacks.
    pub fn advance(&mut self) {
        self.apply_completions();

        if let Some(current) = &self.in_flight {
            log::trace!("Waiting on bundle '{}'.", current.key);
            return;
        }

        match self.pending.pop_front() {
            None => self.finish_batch(),
            Some(key) => self.dispatch(key),
        }
    }

    fn apply_completions(&mut self) {
        while let Ok(completion) = self.completion_rx.try_recv() {
            match &self.in_flight {
                Some(current) if current.generation == completion.generation => {
                    if completion.state.is_done {
                        log::debug!("Bundle '{}' finished loading.", current.key);
                        self.in_flight = None;
                    } else {
                        log::trace!(
                            "Bundle '{}' at {:.0}%.",
                            current.key,
                            completion.state.progress * 100.0
                        );
                    }
                }
                _ => log::warn!(
                    "Ignoring stale load report for bundle '{}' (dispatch #{}).",
                    completion.key,
                    completion.generation
                ),
            }
        }
    }

    fn dispatch(&mut self, key: ResourceKey) {
        let generation = self.next_generation;
        self.next_generation += 1;
        let ticket = LoadTicket::new(key.clone(), generation, self.completion_tx.clone());
        log::debug!(
            "Dispatching bundle '{key}' as #{generation} ({} remaining).",
            self.pending.len()
        );

        match self.loader.load_async(&key, ticket) {
            Ok(()) => self.in_flight = Some(InFlight { key, generation }),
            Err(e) => log::error!("Failed to start loading bundle '{key}': {e:#}"),
        }

        let state = LoadState::in_progress(self.progress());
        self.notify(state);
    }

    fn finish_batch(&mut self) {
        if self.callbacks.is_empty() {
            return;
        }
        log::info!("All {} resource set(s) loaded.", self.total_requested);
        self.notify(LoadState::COMPLETE);
        self.callbacks.clear();
        self.total_requested = 0;
    }

    fn progress(&self) -> f32 {
        if self.total_requested == 0 {
            return 1.0;
        }
        1.0 - self.pending.len() as f32 / self.total_requested as f32
    }

    fn notify(&mut self, state: LoadState) {
        self.last_state = state;
        for callback in &mut self.callbacks {
            invoke_guarded(callback, state);
        }
    }

    /// Drops every pending request and registered callback without notifying.
    ///
    /// Returns the number of requests that were abandoned, including the one in
    /// flight. Reports arriving later for the abandoned request are ignored,
    /// because its dispatch generation is never reused.
    pub fn clear(&mut self) -> usize {
        let abandoned = self.pending.len() + usize::from(self.in_flight.is_some());
        self.pending.clear();
        self.in_flight = None;
        self.callbacks.clear();
        self.total_requested = 0;
        abandoned
    }

    /// `true` while a request is waiting on the loader.
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// The key of the request currently waiting on the loader.
    pub fn in_flight(&self) -> Option<&str> {
        self.in_flight.as_ref().map(|current| current.key.as_str())
    }

    /// Number of requests not yet dispatched.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Size of the current batch; zero once it has drained.
    pub fn total_requested(&self) -> usize {
        self.total_requested
    }

    /// `true` while a batch callback is registered.
    pub fn has_callback(&self) -> bool {
        !self.callbacks.is_empty()
    }

    /// The last state reported to callbacks.
    pub fn last_state(&self) -> LoadState {
        self.last_state
    }

    fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.in_flight.is_none() && self.callbacks.is_empty()
    }
}

impl std::fmt::Debug for LoadQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadQueue")
            .field("pending", &self.pending)
            .field("in_flight", &self.in_flight)
            .field("total_requested", &self.total_requested)
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

/// The request currently waiting on the loader.
#[derive(Debug)]
struct InFlight {
    key: ResourceKey,
    generation: u64,
}

/// Calls a progress callback, logging instead of propagating any failure.
fn invoke_guarded(callback: &mut ProgressCallback, state: LoadState) {
    match panic::catch_unwind(AssertUnwindSafe(|| callback(state))) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => log::error!("Load progress callback error: {e:#}"),
        Err(_) => log::error!("Load progress callback panicked."),
    }
}
