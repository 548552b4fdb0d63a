//! Immutable view of engine state after a tick

use crate::{
    ids::ThoughtId,
    cognition::{dominant_of, Attention, Consciousness, Emotion, EmotionKind, Thought},
    neuron::Neuron,
    region::{Region, RegionRole},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Everything a renderer, UI or exporter may observe
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimulationSnapshot {
    /// Logical time of the tick just executed
    pub time: u64,
    /// Every neuron with its full state
    pub neurons: Vec<Neuron>,
    /// Every region with its current activity
    pub regions: Vec<Region>,
    /// Live thoughts
    pub thoughts: Vec<Thought>,
    /// Emotion registry
    pub emotions: Vec<Emotion>,
    /// Consciousness clarity
    pub consciousness: Consciousness,
    /// Attention focus and level
    pub attention: Attention,
}

impl SimulationSnapshot {
    /// Highest-level emotion, `None` when all are zero
    pub fn dominant_emotion(&self) -> Option<EmotionKind> {
        dominant_of(self.emotions.iter().copied())
    }

    /// Level of one emotion
    pub fn emotion_level(&self, kind: EmotionKind) -> Option<f32> {
        self.emotions.iter().find(|e| e.kind == kind).map(|e| e.level)
    }

    /// Look up a live thought
    pub fn thought(&self, id: ThoughtId) -> Option<&Thought> {
        self.thoughts.iter().find(|thought| thought.id == id)
    }

    /// Up to `n` live thoughts, oldest first
    pub fn oldest_thoughts(&self, n: usize) -> Vec<&Thought> {
        let mut thoughts: Vec<&Thought> = self.thoughts.iter().collect();
        thoughts.sort_by(|a, b| b.age.cmp(&a.age));
        thoughts.truncate(n);
        thoughts
    }

    /// Text of the attended thought
    pub fn focus_text(&self) -> Option<&str> {
        self.attention
            .focus
            .and_then(|id| self.thought(id))
            .map(|thought| thought.text.as_str())
    }

    /// Region playing `role`
    pub fn region(&self, role: RegionRole) -> Option<&Region> {
        self.regions.iter().find(|region| region.role == role)
    }

    /// Neurons that fired on this tick
    pub fn spiking_count(&self) -> usize {
        self.neurons.iter().filter(|neuron| neuron.is_spiking).count()
    }
}
