//! Runtime for the mindsim spiking network simulator
//!
//! A small spiking network is split into functional regions. Every tick the
//! engine injects stimulus, updates neurons, delivers delayed spikes on a
//! logical clock, applies Hebbian plasticity, and derives region activity,
//! emotions, consciousness, attention and short-lived thoughts from the
//! result. All randomness flows from one seedable generator, so a seeded
//! engine is fully reproducible.

#![deny(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod cognition;
pub mod config;
pub mod error;
pub mod ids;
pub mod network;
pub mod neuron;
pub mod plasticity;
pub mod region;
pub mod scheduler;
pub mod simulation;
pub mod snapshot;
pub mod synapse;
pub mod wiring;
pub mod worker;

// Re-export essential types
pub use cognition::{Attention, CognitionModule, Consciousness, Emotion, EmotionKind, Thought};
pub use config::{
    CognitionParams, NetworkConfig, NeuronParams, PlasticityParams, RegionSpec, SimulationConfig,
    StimulusParams,
};
pub use error::{Result, RuntimeError};
pub use ids::{NeuronId, RegionId, SynapseId, ThoughtId};
pub use network::{Network, NetworkBuilder, NeuronSpec};
pub use neuron::{Neuron, NeuronKind, NeuronPhase, Position};
pub use plasticity::{HebbianRule, PlasticityModule, PlasticityRule};
pub use region::{Region, RegionActivities, RegionRole};
pub use scheduler::{ScheduledSpike, SpikeScheduler};
pub use simulation::{SimulationEngine, TickReport};
pub use snapshot::SimulationSnapshot;
pub use synapse::Synapse;
pub use worker::{EngineHandle, TickOutcome};

/// Runtime crate version for compatibility checking
pub const RUNTIME_VERSION: u32 = 1;

/// Wall-clock pacing between ticks at speed 1.0, in milliseconds
///
/// Only drivers use this. The engine itself has no notion of real time.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 50;
