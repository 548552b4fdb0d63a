//! Network topology and the manual network builder

use slotmap::SlotMap;

use crate::{
    ids::{NeuronId, RegionId, SynapseId},
    config::RegionSpec,
    error::*,
    neuron::{Neuron, NeuronKind, Position},
    region::{Region, RegionRole},
    synapse::Synapse,
};

/// Regions, neurons and synapses of one simulation
///
/// Topology (region membership and synapse endpoints) is written only while
/// the network is being built. After that the engine only touches per-tick
/// numeric state.
#[derive(Debug, Clone, Default)]
pub struct Network {
    pub(crate) neurons: SlotMap<NeuronId, Neuron>,
    pub(crate) synapses: SlotMap<SynapseId, Synapse>,
    pub(crate) regions: SlotMap<RegionId, Region>,
}

impl Network {
    /// Start a manual network description
    pub fn builder() -> NetworkBuilder {
        NetworkBuilder::new()
    }

    /// Get neuron count
    pub fn neuron_count(&self) -> usize {
        self.neurons.len()
    }

    /// Get synapse count
    pub fn synapse_count(&self) -> usize {
        self.synapses.len()
    }

    /// Get region count
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Look up a neuron
    pub fn neuron(&self, id: NeuronId) -> Option<&Neuron> {
        self.neurons.get(id)
    }

    /// Look up a synapse
    pub fn synapse(&self, id: SynapseId) -> Option<&Synapse> {
        self.synapses.get(id)
    }

    /// Look up a region
    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(id)
    }

    /// Find the region playing `role`
    pub fn region_by_role(&self, role: RegionRole) -> Option<&Region> {
        self.regions.values().find(|region| region.role == role)
    }

    /// All neurons in id order
    pub fn neurons(&self) -> impl Iterator<Item = &Neuron> + '_ {
        self.neurons.values()
    }

    /// All synapses in id order
    pub fn synapses(&self) -> impl Iterator<Item = &Synapse> + '_ {
        self.synapses.values()
    }

    /// All regions in id order
    pub fn regions(&self) -> impl Iterator<Item = &Region> + '_ {
        self.regions.values()
    }

    /// All neuron ids in id order
    pub fn neuron_ids(&self) -> Vec<NeuronId> {
        self.neurons.keys().collect()
    }

    /// First synapse from `pre` to `post`, if any
    pub fn synapse_between(&self, pre: NeuronId, post: NeuronId) -> Option<&Synapse> {
        let neuron = self.neurons.get(pre)?;
        neuron
            .synapses_out
            .iter()
            .filter_map(|id| self.synapses.get(*id))
            .find(|synapse| synapse.post == post)
    }

    pub(crate) fn neuron_mut(&mut self, id: NeuronId) -> Option<&mut Neuron> {
        self.neurons.get_mut(id)
    }

    pub(crate) fn add_region(&mut self, spec: &RegionSpec, canvas_width: f32, canvas_height: f32) -> RegionId {
        self.regions.insert_with_key(|id| Region {
            id,
            role: spec.role,
            name: spec.name.clone(),
            center_x: spec.center_x * canvas_width,
            center_y: spec.center_y * canvas_height,
            radius: spec.radius,
            neurons: Vec::new(),
            activity: 0.0,
        })
    }

    /// Insert a neuron and record it as a member of `region`
    pub(crate) fn add_neuron(
        &mut self,
        region: RegionId,
        position: Position,
        kind: NeuronKind,
        potential: f32,
        threshold: f32,
    ) -> Option<NeuronId> {
        if !self.regions.contains_key(region) {
            return None;
        }
        let id = self
            .neurons
            .insert_with_key(|id| Neuron::new(id, position, region, kind, potential, threshold));
        if let Some(region) = self.regions.get_mut(region) {
            region.neurons.push(id);
        }
        Some(id)
    }

    /// Insert a synapse; the weight sign follows the source neuron's kind
    pub(crate) fn connect(&mut self, pre: NeuronId, post: NeuronId, weight: f32, delay: u32) -> Option<SynapseId> {
        if pre == post || !self.neurons.contains_key(post) {
            return None;
        }
        let sign = self.neurons.get(pre)?.kind.sign();
        let id = self
            .synapses
            .insert_with_key(|id| Synapse::new(id, pre, post, weight.abs() * sign, delay));
        if let Some(neuron) = self.neurons.get_mut(pre) {
            neuron.synapses_out.push(id);
        }
        if let Some(neuron) = self.neurons.get_mut(post) {
            neuron.synapses_in.push(id);
        }
        Some(id)
    }

    /// Drop a neuron without touching the synapses and regions that name it
    #[cfg(test)]
    pub(crate) fn detach_neuron(&mut self, id: NeuronId) -> Option<Neuron> {
        self.neurons.remove(id)
    }
}

/// Description of one neuron for [`NetworkBuilder`]
#[derive(Debug, Clone, PartialEq)]
pub struct NeuronSpec {
    /// Region the neuron belongs to
    pub region: RegionRole,
    /// Excitatory or inhibitory
    pub kind: NeuronKind,
    /// Position in canvas units
    pub position: Position,
    /// Initial potential
    pub potential: f32,
    /// Initial threshold
    pub threshold: f32,
}

impl NeuronSpec {
    /// Resting neuron at the origin with the baseline threshold
    pub fn new(region: RegionRole, kind: NeuronKind) -> Self {
        Self {
            region,
            kind,
            position: Position::default(),
            potential: 0.0,
            threshold: 0.6,
        }
    }

    /// Set the position
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.position = Position::new(x, y);
        self
    }

    /// Set the initial potential
    pub fn with_potential(mut self, potential: f32) -> Self {
        self.potential = potential;
        self
    }

    /// Set the initial threshold
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }
}

/// Builder for hand-described networks
///
/// Neurons are referred to by the order they were added. Generated
/// networks come from [`crate::wiring::generate`] instead.
#[derive(Debug, Clone)]
pub struct NetworkBuilder {
    canvas_width: f32,
    canvas_height: f32,
    regions: Vec<RegionSpec>,
    neurons: Vec<NeuronSpec>,
    synapses: Vec<(usize, usize, f32, u32)>, // (pre, post, weight, delay)
}

impl NetworkBuilder {
    /// Create a new network builder
    pub fn new() -> Self {
        Self {
            canvas_width: 1.0,
            canvas_height: 1.0,
            regions: Vec::new(),
            neurons: Vec::new(),
            synapses: Vec::new(),
        }
    }

    /// Set the canvas that region centres are fractions of
    pub fn with_canvas(mut self, width: f32, height: f32) -> Self {
        self.canvas_width = width;
        self.canvas_height = height;
        self
    }

    /// Add a region
    pub fn add_region(mut self, spec: RegionSpec) -> Self {
        self.regions.push(spec);
        self
    }

    /// Add a region with a unit radius at the canvas origin
    pub fn add_region_role(self, role: RegionRole) -> Self {
        self.add_region(RegionSpec::new(role, role.name(), 0.0, 0.0, 1.0))
    }

    /// Add a neuron
    pub fn add_neuron(mut self, spec: NeuronSpec) -> Self {
        self.neurons.push(spec);
        self
    }

    /// Add a synapse between neurons by insertion order
    pub fn add_synapse(mut self, pre: usize, post: usize, weight: f32, delay: u32) -> Self {
        self.synapses.push((pre, post, weight, delay));
        self
    }

    /// Build the network
    pub fn build(self) -> Result<Network> {
        if self.regions.is_empty() {
            return Err(RuntimeError::invalid_config("network has no regions"));
        }
        if self.neurons.is_empty() {
            return Err(RuntimeError::invalid_config("network has no neurons"));
        }

        let mut network = Network::default();
        let mut region_ids: Vec<(RegionRole, RegionId)> = Vec::with_capacity(self.regions.len());
        for spec in &self.regions {
            if region_ids.iter().any(|(role, _)| *role == spec.role) {
                return Err(RuntimeError::invalid_config(format!(
                    "region role {} appears more than once",
                    spec.role
                )));
            }
            let id = network.add_region(spec, self.canvas_width, self.canvas_height);
            region_ids.push((spec.role, id));
        }

        let mut neuron_ids = Vec::with_capacity(self.neurons.len());
        for spec in &self.neurons {
            let region = region_ids
                .iter()
                .find(|(role, _)| *role == spec.region)
                .map(|(_, id)| *id)
                .ok_or_else(|| RuntimeError::region_not_found(spec.region.name()))?;
            let id = network
                .add_neuron(region, spec.position, spec.kind, spec.potential, spec.threshold)
                .ok_or_else(|| RuntimeError::region_not_found(spec.region.name()))?;
            neuron_ids.push(id);
        }

        for (pre, post, weight, delay) in self.synapses {
            let (Some(&pre_id), Some(&post_id)) = (neuron_ids.get(pre), neuron_ids.get(post)) else {
                return Err(RuntimeError::invalid_config(format!(
                    "synapse {} -> {} references a missing neuron",
                    pre, post
                )));
            };
            if delay == 0 {
                return Err(RuntimeError::invalid_parameter("delay", "0", ">= 1"));
            }
            network.connect(pre_id, post_id, weight, delay).ok_or_else(|| {
                RuntimeError::invalid_config(format!("synapse {} -> {} is a self-connection", pre, post))
            })?;
        }

        Ok(network)
    }
}

impl Default for NetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_neuron_builder() -> NetworkBuilder {
        NetworkBuilder::new()
            .add_region_role(RegionRole::Sensory)
            .add_neuron(NeuronSpec::new(RegionRole::Sensory, NeuronKind::Excitatory))
            .add_neuron(NeuronSpec::new(RegionRole::Sensory, NeuronKind::Inhibitory))
    }

    #[test]
    fn test_network_builder() {
        let network = two_neuron_builder()
            .add_synapse(0, 1, 0.4, 1)
            .add_synapse(1, 0, 0.3, 2)
            .build()
            .unwrap();

        assert_eq!(network.neuron_count(), 2);
        assert_eq!(network.synapse_count(), 2);
        assert_eq!(network.region_count(), 1);

        let ids = network.neuron_ids();
        let forward = network.synapse_between(ids[0], ids[1]).unwrap();
        assert_eq!(forward.weight, 0.4);
        let backward = network.synapse_between(ids[1], ids[0]).unwrap();
        assert_eq!(backward.weight, -0.3);
        assert_eq!(backward.delay, 2);

        let first = network.neuron(ids[0]).unwrap();
        assert_eq!(first.synapses_out.len(), 1);
        assert_eq!(first.synapses_in.len(), 1);
    }

    #[test]
    fn test_membership_recorded() {
        let network = two_neuron_builder().build().unwrap();
        let region = network.region_by_role(RegionRole::Sensory).unwrap();
        assert_eq!(region.size(), 2);
        for id in &region.neurons {
            assert_eq!(network.neuron(*id).unwrap().region, region.id);
        }
    }

    #[test]
    fn test_builder_rejects_bad_topology() {
        assert!(NetworkBuilder::new().build().is_err());
        assert!(NetworkBuilder::new()
            .add_region_role(RegionRole::Sensory)
            .build()
            .is_err());
        assert!(two_neuron_builder().add_synapse(0, 5, 0.1, 1).build().is_err());
        assert!(two_neuron_builder().add_synapse(0, 0, 0.1, 1).build().is_err());
        assert!(two_neuron_builder().add_synapse(0, 1, 0.1, 0).build().is_err());

        let missing_region = NetworkBuilder::new()
            .add_region_role(RegionRole::Sensory)
            .add_neuron(NeuronSpec::new(RegionRole::Memory, NeuronKind::Excitatory))
            .build();
        assert!(matches!(missing_region, Err(RuntimeError::RegionNotFound { .. })));
    }

    #[test]
    fn test_region_centre_scaled_by_canvas() {
        let network = NetworkBuilder::new()
            .with_canvas(800.0, 600.0)
            .add_region(RegionSpec::new(RegionRole::Sensory, "Sensory", 0.2, 0.5, 80.0))
            .add_neuron(NeuronSpec::new(RegionRole::Sensory, NeuronKind::Excitatory))
            .build()
            .unwrap();
        let region = network.region_by_role(RegionRole::Sensory).unwrap();
        assert_eq!(region.center_x, 160.0);
        assert_eq!(region.center_y, 300.0);
    }
}
