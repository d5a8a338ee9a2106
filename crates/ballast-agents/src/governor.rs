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

//! The per-frame entry point of the resource governor.

use std::sync::Arc;

use ballast_core::{
    BundleLoader, ConfigError, DeliveryModeQuery, GovernorConfig, LoadState, MemoryEventDispatcher,
    MemorySnapshot, MetricSource, ResourceKey,
};

use crate::loading_agent::LoadQueue;
use crate::memory_agent::{
    MemoryOverlay, ReclaimTargets, ReclamationCascade, ThresholdMonitor, TierPolicy,
};

/// The external systems the governor drives.
pub struct Collaborators {
    /// Tells whether bundles must be streamed at all.
    pub delivery: Arc<dyn DeliveryModeQuery>,
    /// Streams and unloads bundles.
    pub loader: Box<dyn BundleLoader>,
    /// Reports process memory.
    pub metrics: Arc<dyn MetricSource>,
    /// Caches released by the reclamation cascade.
    pub targets: ReclaimTargets,
    /// Subscribers told about each reclamation stage before it runs.
    pub events: MemoryEventDispatcher,
}

/// Owns the load queue, both memory monitors, and the reclamation cascade.
///
/// Create one at startup with [`Governor::init`], call [`Governor::tick`] once
/// per frame from the thread that owns it, and hand `&mut Governor` to code
/// that needs to request or release resources.
pub struct Governor {
    config: GovernorConfig,
    loads: LoadQueue,
    total_monitor: ThresholdMonitor,
    heap_monitor: ThresholdMonitor,
    cascade: ReclamationCascade,
    metrics: Arc<dyn MetricSource>,
    last_snapshot: MemorySnapshot,
    frame_count: u64,
}

impl Governor {
    /// Validates `config` and wires the governor to its collaborators.
    pub fn init(config: GovernorConfig, collaborators: Collaborators) -> Result<Self, ConfigError> {
        config.validate()?;

        let Collaborators {
            delivery,
            loader,
            metrics,
            targets,
            events,
        } = collaborators;

        let heap_policy = TierPolicy {
            on_soft: config.heap_soft_reclaim,
            on_critical: config.heap_critical_reclaim,
        };

        log::info!(
            "Governor initialized: total limit {}M, heap limit {}M, soft ratio {:.2}, mode {:?}.",
            config.max_total_memory_mb,
            config.max_heap_memory_mb,
            config.soft_ratio,
            config.app_mode
        );

        Ok(Self {
            total_monitor: ThresholdMonitor::total(
                config.max_total_memory_mb as f32,
                config.soft_ratio,
            ),
            heap_monitor: ThresholdMonitor::heap(
                config.max_heap_memory_mb as f32,
                config.soft_ratio,
                heap_policy,
            ),
            loads: LoadQueue::new(delivery, loader),
            cascade: ReclamationCascade::new(targets, events),
            metrics,
            last_snapshot: MemorySnapshot::default(),
            frame_count: 0,
            config,
        })
    }

    /// Runs one frame: advances loading, then samples both memory tiers.
    pub fn tick(&mut self) {
        self.frame_count += 1;

        self.loads.advance();

        self.metrics.refresh();
        self.last_snapshot = MemorySnapshot::capture(self.metrics.as_ref());
        self.total_monitor.sample(&self.last_snapshot, &mut self.cascade);
        self.heap_monitor.sample(&self.last_snapshot, &mut self.cascade);
    }

    /// Requests a batch of resource sets. See [`LoadQueue::submit`].
    pub fn submit<I, K, F>(&mut self, requests: I, on_progress: F)
    where
        I: IntoIterator<Item = K>,
        K: Into<ResourceKey>,
        F: FnMut(LoadState) -> anyhow::Result<()> + Send + 'static,
    {
        self.loads.submit(requests, on_progress);
    }

    /// Unloads resource sets. See [`LoadQueue::release`].
    pub fn release<I, K>(&mut self, requests: I)
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        self.loads.release(requests);
    }

    /// Runs a full reclamation now, regardless of thresholds.
    pub fn free_memory(&mut self) {
        self.cascade.full();
    }

    /// Releases the heap caches now, regardless of thresholds.
    pub fn free_heap_memory(&mut self) {
        self.cascade.free_heap();
    }

    /// The debug overlay lines for the latest sample, unless running a release build.
    pub fn overlay(&self) -> Option<MemoryOverlay> {
        self.config
            .overlay_enabled()
            .then(|| MemoryOverlay::from_snapshot(&self.last_snapshot))
    }

    /// Stops the governor, abandoning queued loads without notifying their callbacks.
    pub fn shutdown(mut self) {
        let abandoned = self.loads.clear();
        if abandoned > 0 {
            log::warn!("Governor shut down with {abandoned} resource set(s) still queued.");
        }
        log::info!("Governor shut down after {} frame(s).", self.frame_count);
    }

    /// The load queue.
    pub fn load_queue(&self) -> &LoadQueue {
        &self.loads
    }

    /// The total-memory monitor.
    pub fn total_monitor(&self) -> &ThresholdMonitor {
        &self.total_monitor
    }

    /// The heap-memory monitor.
    pub fn heap_monitor(&self) -> &ThresholdMonitor {
        &self.heap_monitor
    }

    /// The reclamation cascade, e.g. to subscribe to memory events after init.
    pub fn cascade_mut(&mut self) -> &mut ReclamationCascade {
        &mut self.cascade
    }

    /// The reclamation cascade.
    pub fn cascade(&self) -> &ReclamationCascade {
        &self.cascade
    }

    /// The memory figures read on the last tick.
    pub fn last_snapshot(&self) -> MemorySnapshot {
        self.last_snapshot
    }

    /// The configuration in effect.
    pub fn config(&self) -> &GovernorConfig {
        &self.config
    }

    /// Number of ticks run so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl std::fmt::Debug for Governor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Governor")
            .field("config", &self.config)
            .field("loads", &self.loads)
            .field("total_monitor", &self.total_monitor)
            .field("heap_monitor", &self.heap_monitor)
            .field("cascade", &self.cascade)
            .field("frame_count", &self.frame_count)
            .finish()
    }
}
