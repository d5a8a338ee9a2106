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

use ballast_core::{MemoryEvent, MemoryEventDispatcher, ReclaimLevel, Reclaimable};

/// The caches a reclamation can release, one slot per collaborator.
pub struct ReclaimTargets {
    /// Pooled game objects.
    pub object_pool: Box<dyn Reclaimable>,
    /// UI panels that are hidden but kept alive for quick reopening.
    pub hidden_ui: Box<dyn Reclaimable>,
    /// Cached gameplay data tables.
    pub data_cache: Box<dyn Reclaimable>,
    /// Cached configuration documents.
    pub config_cache: Box<dyn Reclaimable>,
    /// Cached save/record files.
    pub record_cache: Box<dyn Reclaimable>,
}

impl ReclaimTargets {
    /// Targets that release nothing. Useful for hosts without some caches.
    pub fn none() -> Self {
        fn noop() -> Box<dyn Reclaimable> {
            Box::new(|| -> anyhow::Result<()> { Ok(()) })
        }
        Self {
            object_pool: noop(),
            hidden_ui: noop(),
            data_cache: noop(),
            config_cache: noop(),
            record_cache: noop(),
        }
    }
}

/// The fixed sequence of clears run when memory runs high.
///
/// Each stage announces itself through the [`MemoryEventDispatcher`] before
/// any of its clears run:
///
/// - [`full`](Self::full): `FreeMemory`, object pool, hidden UI, then
///   [`free_heap`](Self::free_heap).
/// - [`free_heap`](Self::free_heap): `FreeHeapMemory`, data, config, and record caches.
pub struct ReclamationCascade {
    targets: ReclaimTargets,
    events: MemoryEventDispatcher,
    full_runs: u64,
    heap_runs: u64,
}

impl ReclamationCascade {
    /// Creates a cascade over `targets`, announcing through `events`.
    pub fn new(targets: ReclaimTargets, events: MemoryEventDispatcher) -> Self {
        Self {
            targets,
            events,
            full_runs: 0,
            heap_runs: 0,
        }
    }

    /// Runs the cascade at `level`.
    pub fn run(&mut self, level: ReclaimLevel) {
        match level {
            ReclaimLevel::Full => self.full(),
            ReclaimLevel::Heap => self.free_heap(),
        }
    }

    /// Releases every reclaimable cache.
    pub fn full(&mut self) {
        log::info!("Releasing all reclaimable memory.");
        self.full_runs += 1;
        self.events.dispatch(MemoryEvent::FreeMemory);

        clear_target("object pool", self.targets.object_pool.as_mut());
        clear_target("hidden UI", self.targets.hidden_ui.as_mut());

        self.free_heap();
    }

    /// Releases the heap-resident data caches.
    pub fn free_heap(&mut self) {
        log::info!("Releasing heap caches.");
        self.heap_runs += 1;
        self.events.dispatch(MemoryEvent::FreeHeapMemory);

        clear_target("data cache", self.targets.data_cache.as_mut());
        clear_target("config cache", self.targets.config_cache.as_mut());
        clear_target("record cache", self.targets.record_cache.as_mut());
    }

    /// The dispatcher announcing each stage, for late subscribers.
    pub fn events_mut(&mut self) -> &mut MemoryEventDispatcher {
        &mut self.events
    }

    /// How many times [`full`](Self::full) has run.
    pub fn full_runs(&self) -> u64 {
        self.full_runs
    }

    /// How many times [`free_heap`](Self::free_heap) has run, including as part of a full run.
    pub fn heap_runs(&self) -> u64 {
        self.heap_runs
    }
}

impl std::fmt::Debug for ReclamationCascade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReclamationCascade")
            .field("events", &self.events)
            .field("full_runs", &self.full_runs)
            .field("heap_runs", &self.heap_runs)
            .finish()
    }
}

fn clear_target(name: &str, target: &mut dyn Reclaimable) {
    if let Err(e) = target.reclaim() {
        log::warn!("Failed to release {name}: {e:#}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    type Journal = Arc<Mutex<Vec<String>>>;

    fn recording(journal: &Journal, name: &'static str) -> Box<dyn Reclaimable> {
        let journal = Arc::clone(journal);
        Box::new(move || -> anyhow::Result<()> {
            journal.lock().unwrap().push(name.to_string());
            Ok(())
        })
    }

    fn recording_cascade(journal: &Journal) -> ReclamationCascade {
        let targets = ReclaimTargets {
            object_pool: recording(journal, "pool"),
            hidden_ui: recording(journal, "ui"),
            data_cache: recording(journal, "data"),
            config_cache: recording(journal, "config"),
            record_cache: recording(journal, "record"),
        };
        let mut events = MemoryEventDispatcher::new();
        let sink = Arc::clone(journal);
        events.subscribe(move |event: MemoryEvent| {
            sink.lock().unwrap().push(event.to_string())
        });
        ReclamationCascade::new(targets, events)
    }

    #[test]
    fn full_announces_before_each_stage() {
        let journal = Journal::default();
        let mut cascade = recording_cascade(&journal);

        cascade.full();

        assert_eq!(
            *journal.lock().unwrap(),
            vec![
                "free-memory",
                "pool",
                "ui",
                "free-heap-memory",
                "data",
                "config",
                "record"
            ]
        );
        assert_eq!(cascade.full_runs(), 1);
        assert_eq!(cascade.heap_runs(), 1);
    }

    #[test]
    fn heap_level_skips_pool_and_ui() {
        let journal = Journal::default();
        let mut cascade = recording_cascade(&journal);

        cascade.run(ReclaimLevel::Heap);

        assert_eq!(
            *journal.lock().unwrap(),
            vec!["free-heap-memory", "data", "config", "record"]
        );
        assert_eq!(cascade.full_runs(), 0);
    }

    #[test]
    fn failing_target_does_not_stop_the_cascade() {
        let journal = Journal::default();
        let mut cascade = recording_cascade(&journal);
        cascade.targets.hidden_ui =
            Box::new(|| -> anyhow::Result<()> { Err(anyhow::anyhow!("ui is busy")) });

        cascade.full();

        let journal = journal.lock().unwrap();
        assert!(!journal.contains(&"ui".to_string()));
        assert_eq!(journal.last().map(String::as_str), Some("record"));
    }

    #[test]
    fn none_targets_run_cleanly() {
        let mut cascade = ReclamationCascade::new(ReclaimTargets::none(), Default::default());
        cascade.full();
        assert_eq!(cascade.full_runs(), 1);
    }
}
