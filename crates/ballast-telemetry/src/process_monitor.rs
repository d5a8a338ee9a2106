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

//! Process memory metric source.
//!
//! Total-tier metrics come from the operating system through `sysinfo`
//! (resident set and virtual size of the current process). Heap-tier metrics come from the
//! counters maintained by [`TrackingAllocator`](crate::TrackingAllocator); they
//! read zero unless it is registered as the global allocator.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use ballast_core::memory::heap_stats;
use ballast_core::MetricSource;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Default, Clone, Copy)]
struct ProcessSample {
    resident_bytes: u64,
    virtual_bytes: u64,
}

impl ProcessSample {
    fn reserved_bytes(&self) -> u64 {
        self.virtual_bytes.max(self.resident_bytes)
    }
}

#[derive(Debug)]
struct Inner {
    system: System,
    sample: ProcessSample,
    last_refresh: Option<Instant>,
}

/// A [`MetricSource`] backed by the OS view of the current process.
///
/// * total allocated: current resident set size
/// * total reserved: current virtual size, which falls again once the
///   allocator hands memory back to the OS
/// * heap used / capacity: tracked live bytes / tracked peak bytes
///
/// Querying the OS every frame is wasteful, so [`MetricSource::refresh`] only
/// re-reads the process once per refresh interval.
#[derive(Debug)]
pub struct ProcessMetricSource {
    pid: Option<Pid>,
    refresh_interval: Duration,
    inner: Mutex<Inner>,
}

impl ProcessMetricSource {
    /// Creates a source refreshing every 250ms.
    pub fn new() -> Self {
        Self::with_refresh_interval(DEFAULT_REFRESH_INTERVAL)
    }

    /// Creates a source refreshing at most once per `refresh_interval`.
    pub fn with_refresh_interval(refresh_interval: Duration) -> Self {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(e) => {
                log::warn!("Cannot resolve current pid ({e}); process memory will read as 0.");
                None
            }
        };

        let source = Self {
            pid,
            refresh_interval,
            inner: Mutex::new(Inner {
                system: System::new(),
                sample: ProcessSample::default(),
                last_refresh: None,
            }),
        };
        source.refresh();
        source
    }

    fn sample(&self) -> ProcessSample {
        self.inner
            .lock()
            .map(|inner| inner.sample)
            .unwrap_or_default()
    }
}

impl Default for ProcessMetricSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricSource for ProcessMetricSource {
    fn total_allocated_bytes(&self) -> u64 {
        self.sample().resident_bytes
    }

    fn total_reserved_bytes(&self) -> u64 {
        self.sample().reserved_bytes()
    }

    fn heap_used_bytes(&self) -> u64 {
        heap_stats().current_bytes as u64
    }

    fn heap_capacity_bytes(&self) -> u64 {
        heap_stats().peak_bytes
    }

    fn refresh(&self) {
        let Some(pid) = self.pid else {
            return;
        };
        let Ok(mut inner) = self.inner.lock() else {
            log::error!("Process metric source lock poisoned; keeping stale readings.");
            return;
        };

        let due = inner
            .last_refresh
            .map_or(true, |at| at.elapsed() >= self.refresh_interval);
        if !due {
            return;
        }

        inner.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing().with_memory(),
        );

        let reading = inner.system.process(pid).map(|process| ProcessSample {
            resident_bytes: process.memory(),
            virtual_bytes: process.virtual_memory(),
        });
        match reading {
            Some(sample) => inner.sample = sample,
            None => log::warn!("Process {pid} not found while sampling memory."),
        }
        inner.last_refresh = Some(Instant::now());
        log::trace!(
            "Sampled process memory: {} bytes resident, {} bytes virtual.",
            inner.sample.resident_bytes,
            inner.sample.virtual_bytes
        );
    }
}
