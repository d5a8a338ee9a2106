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

//! Recording fakes for the governor's collaborators.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use ballast_agents::{Collaborators, ReclaimTargets};
use ballast_core::{
    BundleLoader, DeliveryMode, DeliveryModeQuery, LoadState, LoadTicket, MemoryEvent,
    MemoryEventDispatcher, MetricSource, Reclaimable,
};

pub const MB: u64 = 1024 * 1024;

/// Delivery mode that tests can flip at runtime.
#[derive(Debug, Default)]
pub struct SwitchableMode {
    streamed: AtomicBool,
}

impl SwitchableMode {
    pub fn streamed() -> Arc<Self> {
        let mode = Self::default();
        mode.set_streamed(true);
        Arc::new(mode)
    }

    pub fn embedded() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_streamed(&self, streamed: bool) {
        self.streamed.store(streamed, Ordering::SeqCst);
    }
}

impl DeliveryModeQuery for SwitchableMode {
    fn delivery_mode(&self) -> DeliveryMode {
        if self.streamed.load(Ordering::SeqCst) {
            DeliveryMode::Streamed
        } else {
            DeliveryMode::Embedded
        }
    }
}

/// What the fake loader has been asked to do.
#[derive(Debug, Default)]
pub struct LoaderLog {
    pub dispatched: Vec<String>,
    pub unloaded: Vec<String>,
    pub tickets: Vec<LoadTicket>,
}

impl LoaderLog {
    /// Finishes the oldest outstanding ticket.
    pub fn finish_next(&mut self) {
        assert!(!self.tickets.is_empty(), "no outstanding load to finish");
        self.tickets.remove(0).finish();
    }
}

/// A loader that parks every ticket until the test finishes it.
#[derive(Debug, Clone, Default)]
pub struct ManualLoader {
    pub log: Arc<Mutex<LoaderLog>>,
    pub fail_keys: Vec<String>,
}

impl BundleLoader for ManualLoader {
    fn load_async(&mut self, key: &str, ticket: LoadTicket) -> anyhow::Result<()> {
        if self.fail_keys.iter().any(|k| k == key) {
            anyhow::bail!("bundle '{key}' is missing from the manifest");
        }
        let mut log = self.log.lock().unwrap();
        log.dispatched.push(key.to_string());
        log.tickets.push(ticket);
        Ok(())
    }

    fn unload(&mut self, key: &str) {
        self.log.lock().unwrap().unloaded.push(key.to_string());
    }
}

/// A loader that completes every request before `load_async` returns.
#[derive(Debug, Clone, Default)]
pub struct InstantLoader {
    pub dispatched: Arc<Mutex<Vec<String>>>,
}

impl BundleLoader for InstantLoader {
    fn load_async(&mut self, key: &str, ticket: LoadTicket) -> anyhow::Result<()> {
        self.dispatched.lock().unwrap().push(key.to_string());
        ticket.report(LoadState::in_progress(0.5));
        ticket.finish();
        Ok(())
    }

    fn unload(&mut self, _key: &str) {}
}

/// Memory figures set directly by the test, in whole megabytes.
#[derive(Debug, Default)]
pub struct FakeMetrics {
    total_allocated: AtomicU64,
    total_reserved: AtomicU64,
    heap_used: AtomicU64,
    heap_capacity: AtomicU64,
}

impl FakeMetrics {
    pub fn set_total_mb(&self, mb: u64) {
        self.total_allocated.store(mb * MB, Ordering::SeqCst);
        self.total_reserved.store(mb * MB, Ordering::SeqCst);
    }

    pub fn set_heap_mb(&self, mb: u64) {
        self.heap_used.store(mb * MB, Ordering::SeqCst);
        self.heap_capacity.store(mb * MB, Ordering::SeqCst);
    }
}

impl MetricSource for FakeMetrics {
    fn total_allocated_bytes(&self) -> u64 {
        self.total_allocated.load(Ordering::SeqCst)
    }
    fn total_reserved_bytes(&self) -> u64 {
        self.total_reserved.load(Ordering::SeqCst)
    }
    fn heap_used_bytes(&self) -> u64 {
        self.heap_used.load(Ordering::SeqCst)
    }
    fn heap_capacity_bytes(&self) -> u64 {
        self.heap_capacity.load(Ordering::SeqCst)
    }
}

/// Shared, ordered record of memory events and cache clears.
pub type Journal = Arc<Mutex<Vec<String>>>;

fn recording_target(journal: &Journal, name: &'static str) -> Box<dyn Reclaimable> {
    let journal = Arc::clone(journal);
    Box::new(move || -> anyhow::Result<()> {
        journal.lock().unwrap().push(name.to_string());
        Ok(())
    })
}

pub fn recording_targets(journal: &Journal) -> ReclaimTargets {
    ReclaimTargets {
        object_pool: recording_target(journal, "object-pool"),
        hidden_ui: recording_target(journal, "hidden-ui"),
        data_cache: recording_target(journal, "data-cache"),
        config_cache: recording_target(journal, "config-cache"),
        record_cache: recording_target(journal, "record-cache"),
    }
}

pub fn recording_events(journal: &Journal) -> MemoryEventDispatcher {
    let mut events = MemoryEventDispatcher::new();
    let sink = Arc::clone(journal);
    events.subscribe(move |event: MemoryEvent| {
        sink.lock().unwrap().push(event.to_string())
    });
    events
}

/// Everything a governor test needs to drive and observe.
pub struct Harness {
    pub mode: Arc<SwitchableMode>,
    pub loader: ManualLoader,
    pub metrics: Arc<FakeMetrics>,
    pub journal: Journal,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            mode: SwitchableMode::streamed(),
            loader: ManualLoader::default(),
            metrics: Arc::new(FakeMetrics::default()),
            journal: Journal::default(),
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            delivery: self.mode.clone(),
            loader: Box::new(self.loader.clone()),
            metrics: self.metrics.clone(),
            targets: recording_targets(&self.journal),
            events: recording_events(&self.journal),
        }
    }

    /// How many times a full reclamation has been announced.
    pub fn full_reclaims(&self) -> usize {
        self.count("free-memory")
    }

    /// How many times the heap caches have been announced for release.
    pub fn heap_reclaims(&self) -> usize {
        self.count("free-heap-memory")
    }

    fn count(&self, entry: &str) -> usize {
        self.journal
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.as_str() == entry)
            .count()
    }
}

/// A progress callback that records every state it sees.
pub fn recording_callback(
    seen: &Arc<Mutex<Vec<LoadState>>>,
) -> impl FnMut(LoadState) -> anyhow::Result<()> + Send + 'static {
    let seen = Arc::clone(seen);
    move |state| {
        seen.lock().unwrap().push(state);
        Ok(())
    }
}
