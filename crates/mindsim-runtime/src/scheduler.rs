//! Logical-time spike scheduler
//!
//! Spikes emitted on tick `T` through a synapse with delay `d` are held here
//! until tick `T + d`. Delivery depends only on the tick counter, so the rate
//! at which a driver requests ticks never changes what gets delivered when.

use std::collections::BTreeMap;

use crate::ids::NeuronId;

/// A spike waiting for delivery
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledSpike {
    /// Destination neuron
    pub target: NeuronId,
    /// Potential added on delivery
    pub weight: f32,
}

/// Spikes in flight keyed by delivery tick
#[derive(Debug, Clone, Default)]
pub struct SpikeScheduler {
    pending: BTreeMap<u64, Vec<ScheduledSpike>>,
    len: usize,
}

impl SpikeScheduler {
    /// Create an empty scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a spike for delivery at `delivery_tick`
    pub fn schedule(&mut self, spike: ScheduledSpike, delivery_tick: u64) {
        self.pending.entry(delivery_tick).or_default().push(spike);
        self.len += 1;
    }

    /// Remove and return every spike due at or before `current_tick`
    ///
    /// Spikes whose tick has already passed are returned too rather than
    /// being dropped. Within a tick, spikes come out in scheduling order.
    pub fn drain(&mut self, current_tick: u64) -> Vec<ScheduledSpike> {
        let later = match current_tick.checked_add(1) {
            Some(next) => self.pending.split_off(&next),
            None => BTreeMap::new(),
        };
        let due = std::mem::replace(&mut self.pending, later);
        let spikes: Vec<ScheduledSpike> = due.into_values().flatten().collect();
        self.len -= spikes.len();
        spikes
    }

    /// Number of spikes in flight
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when nothing is in flight
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Earliest tick with a pending delivery
    pub fn next_delivery_tick(&self) -> Option<u64> {
        self.pending.keys().next().copied()
    }

    /// Drop everything in flight
    pub fn clear(&mut self) {
        self.pending.clear();
        self.len = 0;
    }
}
