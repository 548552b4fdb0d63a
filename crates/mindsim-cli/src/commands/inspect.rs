//! Network and snapshot inspection command

use anyhow::Context;
use clap::Args;
use std::path::{Path, PathBuf};
use tracing::info;

use mindsim_runtime::{NeuronKind, SimulationEngine, SimulationSnapshot};

use crate::{
    config,
    error::{CliError, CliResult},
};

/// Summarise a generated network or an exported snapshot
#[derive(Args, Debug)]
pub struct InspectCommand {
    /// Read a snapshot JSON file instead of generating a network
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Random seed for the generated network
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override the neuron count
    #[arg(long)]
    pub neurons: Option<usize>,

    /// Number of thoughts to list from a snapshot
    #[arg(long, default_value = "5")]
    pub thoughts: usize,
}

impl InspectCommand {
    pub async fn execute(self, config_path: Option<PathBuf>) -> CliResult<()> {
        match &self.snapshot {
            Some(path) => self.inspect_snapshot(path),
            None => self.inspect_network(config_path),
        }
    }

    fn inspect_network(&self, config_path: Option<PathBuf>) -> CliResult<()> {
        let mut simulation = config::resolve(config_path.as_deref())?;
        if let Some(seed) = self.seed {
            simulation.seed = Some(seed);
        }
        if let Some(neurons) = self.neurons {
            simulation.network.neuron_count = neurons;
        }

        let engine = SimulationEngine::new(simulation)?;
        let network = engine.network();
        let excitatory = network
            .neurons()
            .filter(|n| n.kind == NeuronKind::Excitatory)
            .count();

        println!("neurons: {}", network.neuron_count());
        println!("  excitatory: {}", excitatory);
        println!("  inhibitory: {}", network.neuron_count() - excitatory);
        println!("synapses: {}", network.synapse_count());
        println!("regions: {}", network.region_count());
        for region in network.regions() {
            let outgoing: usize = region
                .neurons
                .iter()
                .filter_map(|&id| network.neuron(id))
                .map(|n| n.synapses_out.len())
                .sum();
            println!(
                "  {:<12} {:>5} neurons {:>7} outgoing synapses",
                region.role,
                region.neurons.len(),
                outgoing
            );
        }
        Ok(())
    }

    fn inspect_snapshot(&self, path: &Path) -> CliResult<()> {
        if !path.exists() {
            return Err(CliError::missing_resource(format!("snapshot {}", path.display())));
        }
        info!("Reading snapshot {}", path.display());
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading snapshot {}", path.display()))?;
        let snapshot: SimulationSnapshot = serde_json::from_str(&content)
            .with_context(|| format!("parsing snapshot {}", path.display()))?;

        println!("time: {}", snapshot.time);
        println!("neurons: {} ({} spiking)", snapshot.neurons.len(), snapshot.spiking_count());
        println!(
            "mood: {}",
            snapshot.dominant_emotion().map(|e| e.name()).unwrap_or("calm")
        );
        println!("clarity: {:.4}", snapshot.consciousness.clarity);
        println!("focus: {}", snapshot.focus_text().unwrap_or("none"));
        println!("thoughts: {}", snapshot.thoughts.len());
        for thought in snapshot.oldest_thoughts(self.thoughts) {
            println!(
                "  [{}] {} (strength {:.3}, age {})",
                thought.label(),
                thought.text,
                thought.strength,
                thought.age
            );
        }
        Ok(())
    }
}
