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

use ballast_core::{MemorySnapshot, ReclaimLevel};

use super::ReclamationCascade;

/// Which memory figure a monitor watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryTier {
    /// Total process memory, read from the reserved figure.
    Total,
    /// Managed heap memory, read from the used figure.
    Heap,
}

impl MemoryTier {
    /// Picks this tier's figure out of a snapshot, in megabytes.
    pub fn read(self, snapshot: &MemorySnapshot) -> f32 {
        match self {
            MemoryTier::Total => snapshot.total_reserved_mb,
            MemoryTier::Heap => snapshot.heap_used_mb,
        }
    }

    fn label(self) -> &'static str {
        match self {
            MemoryTier::Total => "Total",
            MemoryTier::Heap => "Heap",
        }
    }
}

/// Whether each ceiling was already exceeded on the previous sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThresholdState {
    /// Above the soft ceiling.
    pub high: bool,
    /// Above the hard ceiling.
    pub critical: bool,
}

/// The upward crossings detected by one sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThresholdEdges {
    /// The soft ceiling was crossed on this sample.
    pub entered_soft: bool,
    /// The hard ceiling was crossed on this sample.
    pub entered_critical: bool,
}

impl ThresholdEdges {
    /// `true` if nothing was crossed.
    pub fn is_empty(&self) -> bool {
        !self.entered_soft && !self.entered_critical
    }
}

/// What a monitor does on each crossing, beyond logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TierPolicy {
    /// Reclamation run when the soft ceiling is crossed.
    pub on_soft: Option<ReclaimLevel>,
    /// Reclamation run when the hard ceiling is crossed. An alert is always logged.
    pub on_critical: Option<ReclaimLevel>,
}

impl TierPolicy {
    /// Full reclamation on both crossings: the total-memory behaviour.
    pub const FULL_ON_BOTH: TierPolicy = TierPolicy {
        on_soft: Some(ReclaimLevel::Full),
        on_critical: Some(ReclaimLevel::Full),
    };

    /// Alert only: the default heap-memory behaviour.
    pub const ALERT_ONLY: TierPolicy = TierPolicy {
        on_soft: None,
        on_critical: None,
    };
}

/// Edge-triggered hysteresis over one memory figure.
///
/// Reactions fire on the sample where a ceiling is first exceeded, never again
/// while it stays exceeded. Falling back to or below a ceiling re-arms it.
#[derive(Debug, Clone)]
pub struct ThresholdMonitor {
    tier: MemoryTier,
    limit_mb: f32,
    soft_mb: f32,
    policy: TierPolicy,
    state: ThresholdState,
    alerts: u64,
}

impl ThresholdMonitor {
    /// Creates a monitor with a hard ceiling of `limit_mb` and a soft ceiling
    /// of `limit_mb * soft_ratio`.
    pub fn new(tier: MemoryTier, limit_mb: f32, soft_ratio: f32, policy: TierPolicy) -> Self {
        Self {
            tier,
            limit_mb,
            soft_mb: limit_mb * soft_ratio,
            policy,
            state: ThresholdState::default(),
            alerts: 0,
        }
    }

    /// The total-memory monitor: full reclamation on both crossings.
    pub fn total(limit_mb: f32, soft_ratio: f32) -> Self {
        Self::new(MemoryTier::Total, limit_mb, soft_ratio, TierPolicy::FULL_ON_BOTH)
    }

    /// The heap-memory monitor with the given policy.
    pub fn heap(limit_mb: f32, soft_ratio: f32, policy: TierPolicy) -> Self {
        Self::new(MemoryTier::Heap, limit_mb, soft_ratio, policy)
    }

    /// Advances the state machine with a new reading and reports the crossings.
    pub fn observe(&mut self, value_mb: f32) -> ThresholdEdges {
        let mut edges = ThresholdEdges::default();

        if value_mb > self.soft_mb {
            edges.entered_soft = !self.state.high;
            self.state.high = true;

            if value_mb > self.limit_mb {
                edges.entered_critical = !self.state.critical;
                self.state.critical = true;
            } else {
                self.state.critical = false;
            }
        } else {
            self.state = ThresholdState::default();
        }

        edges
    }

    /// Samples this tier's figure from `snapshot` and reacts to any crossing.
    ///
    /// On a soft crossing the soft policy runs; on a hard crossing the critical
    /// policy runs and an alert is logged. Both may happen on the same sample,
    /// soft first.
    pub fn sample(
        &mut self,
        snapshot: &MemorySnapshot,
        cascade: &mut ReclamationCascade,
    ) -> ThresholdEdges {
        let value_mb = self.tier.read(snapshot);
        let edges = self.observe(value_mb);

        if edges.entered_soft {
            log::warn!(
                "{} memory above soft ceiling: {:.2}M > {:.2}M",
                self.tier.label(),
                value_mb,
                self.soft_mb
            );
            if let Some(level) = self.policy.on_soft {
                cascade.run(level);
            }
        }

        if edges.entered_critical {
            if let Some(level) = self.policy.on_critical {
                cascade.run(level);
            }
            self.alerts += 1;
            log::error!(
                "{} memory over limit! Current usage: {:.2}M (limit {:.0}M)",
                self.tier.label(),
                value_mb,
                self.limit_mb
            );
        }

        edges
    }

    /// Which figure this monitor watches.
    pub fn tier(&self) -> MemoryTier {
        self.tier
    }

    /// Flags as of the last sample.
    pub fn state(&self) -> ThresholdState {
        self.state
    }

    /// Number of over-limit alerts raised so far.
    pub fn alert_count(&self) -> u64 {
        self.alerts
    }

    /// The hard ceiling in megabytes.
    pub fn limit_mb(&self) -> f32 {
        self.limit_mb
    }

    /// The soft ceiling in megabytes.
    pub fn soft_limit_mb(&self) -> f32 {
        self.soft_mb
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn edges(soft: bool, critical: bool) -> ThresholdEdges {
        ThresholdEdges {
            entered_soft: soft,
            entered_critical: critical,
        }
    }

    #[test]
    fn soft_ceiling_is_a_fraction_of_the_limit() {
        let monitor = ThresholdMonitor::total(100.0, 0.7);
        assert_relative_eq!(monitor.soft_limit_mb(), 70.0);
        assert_relative_eq!(monitor.limit_mb(), 100.0);
    }

    #[test]
    fn soft_crossing_fires_once_while_sustained() {
        let mut monitor = ThresholdMonitor::total(100.0, 0.7);
        assert_eq!(monitor.observe(75.0), edges(true, false));
        assert_eq!(monitor.observe(75.0), edges(false, false));
        assert_eq!(monitor.observe(80.0), edges(false, false));
        assert!(monitor.state().high);
    }

    #[test]
    fn values_on_a_ceiling_do_not_cross_it() {
        let mut monitor = ThresholdMonitor::total(100.0, 0.7);
        assert!(monitor.observe(70.0).is_empty());
        assert_eq!(monitor.observe(100.0), edges(true, false));
        assert!(!monitor.state().critical);
    }

    #[test]
    fn jump_straight_past_the_limit_reports_both_edges() {
        let mut monitor = ThresholdMonitor::total(100.0, 0.7);
        assert_eq!(monitor.observe(150.0), edges(true, true));
        assert_eq!(monitor.observe(150.0), edges(false, false));
    }

    #[test]
    fn critical_rearms_when_back_under_the_limit() {
        let mut monitor = ThresholdMonitor::heap(50.0, 0.7, TierPolicy::ALERT_ONLY);
        assert_eq!(monitor.observe(60.0), edges(true, true));
        assert_eq!(monitor.observe(45.0), edges(false, false));
        assert_eq!(
            monitor.state(),
            ThresholdState {
                high: true,
                critical: false
            }
        );
        assert_eq!(monitor.observe(60.0), edges(false, true));
    }

    #[test]
    fn dropping_under_soft_clears_both_flags() {
        let mut monitor = ThresholdMonitor::total(100.0, 0.7);
        monitor.observe(120.0);
        assert_eq!(monitor.observe(10.0), edges(false, false));
        assert_eq!(monitor.state(), ThresholdState::default());
        assert_eq!(monitor.observe(120.0), edges(true, true));
    }

    #[test]
    fn tiers_read_their_own_figure() {
        let snapshot = MemorySnapshot {
            total_allocated_mb: 1.0,
            total_reserved_mb: 2.0,
            heap_used_mb: 3.0,
            heap_capacity_mb: 4.0,
        };
        assert_relative_eq!(MemoryTier::Total.read(&snapshot), 2.0);
        assert_relative_eq!(MemoryTier::Heap.read(&snapshot), 3.0);
    }
}
