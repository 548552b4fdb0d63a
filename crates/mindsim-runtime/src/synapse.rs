//! Synaptic connections

use crate::ids::{NeuronId, SynapseId};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Directed, delayed, signed connection between two neurons
///
/// The sign of `weight` is fixed at creation by the source neuron's kind and
/// is preserved by every weight update.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Synapse {
    /// Synapse id
    pub id: SynapseId,
    /// Pre-synaptic neuron
    pub pre: NeuronId,
    /// Post-synaptic neuron
    pub post: NeuronId,
    /// Signed weight, magnitude in `[0, max_weight]`
    pub weight: f32,
    /// Transmission delay in ticks, at least 1
    pub delay: u32,
    /// Tick of the last pre-synaptic spike seen by plasticity
    pub last_pre_spike: Option<u64>,
    /// Tick of the last post-synaptic spike seen by plasticity
    pub last_post_spike: Option<u64>,
}

impl Synapse {
    /// Create a new synapse
    pub fn new(id: SynapseId, pre: NeuronId, post: NeuronId, weight: f32, delay: u32) -> Self {
        Self {
            id,
            pre,
            post,
            weight,
            delay: delay.max(1),
            last_pre_spike: None,
            last_post_spike: None,
        }
    }

    /// True for synapses leaving an inhibitory neuron
    pub fn is_inhibitory(&self) -> bool {
        self.weight.is_sign_negative()
    }

    /// Scale the weight magnitude, clamping to `max_weight`, keeping the sign
    pub fn scale_weight(&mut self, factor: f32, max_weight: f32) {
        let magnitude = (self.weight.abs() * factor).clamp(0.0, max_weight);
        self.weight = magnitude.copysign(self.weight);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::detached;

    fn synapse(weight: f32) -> Synapse {
        Synapse::new(
            detached(0),
            detached(0),
            detached(1),
            weight,
            1,
        )
    }

    #[test]
    fn test_delay_at_least_one() {
        let mut s = synapse(0.2);
        assert_eq!(s.delay, 1);
        s = Synapse::new(s.id, s.pre, s.post, 0.2, 0);
        assert_eq!(s.delay, 1);
    }

    #[test]
    fn test_scale_preserves_sign() {
        let mut s = synapse(-0.5);
        s.scale_weight(1.01, 1.0);
        assert!(s.is_inhibitory());
        assert!((s.weight + 0.505).abs() < 1e-6);

        s.scale_weight(10.0, 1.0);
        assert_eq!(s.weight, -1.0);
    }

    #[test]
    fn test_scale_clamps_magnitude() {
        let mut s = synapse(0.995);
        s.scale_weight(1.01, 1.0);
        assert_eq!(s.weight, 1.0);

        s.scale_weight(0.5, 1.0);
        assert_eq!(s.weight, 0.5);
    }
}
