//! Simulation run command

use clap::Args;
use std::path::PathBuf;
use std::time::Duration;
use tokio::{
    task,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, info};

use mindsim_runtime::{
    EngineHandle, RegionRole, SimulationEngine, SimulationSnapshot, TickOutcome, DEFAULT_TICK_INTERVAL_MS,
};

use crate::{
    config,
    error::{CliError, CliResult},
};

/// Run the simulation
#[derive(Args, Debug)]
pub struct RunCommand {
    /// Number of ticks to run
    #[arg(short, long, default_value = "200")]
    pub ticks: u64,

    /// Sensory stimulus level (per-neuron probability is level / 1000)
    #[arg(short, long, default_value = "100")]
    pub stimulus: f32,

    /// Run asleep: no sensory input, occasional spontaneous replay
    #[arg(long)]
    pub sleep: bool,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override the neuron count
    #[arg(long)]
    pub neurons: Option<usize>,

    /// Speed multiplier; divides the pacing interval
    #[arg(long, default_value = "1.0")]
    pub speed: f64,

    /// Pacing interval in milliseconds (0 runs unpaced); overrides --speed
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Damage a region before the first tick (repeatable)
    #[arg(long, value_parser = parse_role)]
    pub damage: Vec<RegionRole>,

    /// Poke the network at X,Y before the first tick (repeatable)
    #[arg(long, value_parser = parse_point)]
    pub poke: Vec<(f32, f32)>,

    /// Log a progress line every N ticks (0 disables)
    #[arg(long, default_value = "50")]
    pub report_every: u64,

    /// Write the final snapshot as JSON
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

fn parse_role(s: &str) -> Result<RegionRole, String> {
    s.parse::<RegionRole>().map_err(|e| e.to_string())
}

fn parse_point(s: &str) -> Result<(f32, f32), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("invalid point: no `,` found in `{}`", s))?;
    let x = x.trim().parse::<f32>().map_err(|e| e.to_string())?;
    let y = y.trim().parse::<f32>().map_err(|e| e.to_string())?;
    Ok((x, y))
}

impl RunCommand {
    pub async fn execute(self, config_path: Option<PathBuf>) -> CliResult<()> {
        let mut simulation = config::resolve(config_path.as_deref())?;
        if let Some(seed) = self.seed {
            simulation.seed = Some(seed);
        }
        if let Some(neurons) = self.neurons {
            simulation.network.neuron_count = neurons;
        }
        let pacing = self.pacing()?;

        info!(
            "Starting simulation: {} ticks, stimulus {}, {}",
            self.ticks,
            self.stimulus,
            if self.sleep { "asleep" } else { "awake" }
        );

        let engine = SimulationEngine::new(simulation)?;
        let mut handle = EngineHandle::spawn(engine);

        for &(x, y) in &self.poke {
            let boosted = handle.stimulate(x, y)?;
            info!("Poke at ({}, {}) reached {} neurons", x, y, boosted);
        }
        for &role in &self.damage {
            let affected = handle.damage(role)?;
            info!("Damaged {} region ({} neurons)", role, affected);
        }

        self.drive(&mut handle, pacing).await?;

        let engine = handle.shutdown()?;
        let snapshot = engine.snapshot();
        info!("Simulation completed at tick {}", snapshot.time);
        print_summary(&snapshot);

        if let Some(path) = &self.output {
            let json = serde_json::to_string_pretty(&snapshot)?;
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(path, json)?;
            info!("Snapshot written to {}", path.display());
        }

        Ok(())
    }

    /// Interval between tick requests, `None` for unpaced
    fn pacing(&self) -> CliResult<Option<Duration>> {
        let millis = match self.interval_ms {
            Some(ms) => ms as f64,
            None => {
                if !(self.speed.is_finite() && self.speed > 0.0) {
                    return Err(CliError::invalid_args(format!(
                        "speed must be a positive number, got {}",
                        self.speed
                    )));
                }
                DEFAULT_TICK_INTERVAL_MS as f64 / self.speed
            }
        };
        let period = Duration::try_from_secs_f64(millis / 1000.0)
            .map_err(|e| CliError::invalid_args(format!("tick interval out of range: {}", e)))?;
        Ok(if period.is_zero() { None } else { Some(period) })
    }

    async fn drive(&self, handle: &mut EngineHandle, pacing: Option<Duration>) -> CliResult<()> {
        match pacing {
            Some(period) => self.run_paced(handle, period).await,
            // Blocking round trips to the engine thread
            None => task::block_in_place(|| self.run_unpaced(handle)),
        }
    }

    fn run_unpaced(&self, handle: &mut EngineHandle) -> CliResult<()> {
        for _ in 0..self.ticks {
            let outcome = handle.tick_blocking(self.stimulus, self.sleep)?;
            self.progress(&outcome);
        }
        Ok(())
    }

    /// Request a tick on each beat unless one is still being computed
    async fn run_paced(&self, handle: &mut EngineHandle, period: Duration) -> CliResult<()> {
        let mut beat = time::interval(period);
        beat.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut completed = 0;
        while completed < self.ticks {
            beat.tick().await;
            if let Some(outcome) = handle.try_recv()? {
                completed += 1;
                self.progress(&outcome);
            }
            if completed < self.ticks && !handle.is_tick_in_flight() {
                handle.request_tick(self.stimulus, self.sleep)?;
            } else if handle.is_tick_in_flight() {
                debug!("Tick still in flight, skipping beat");
            }
        }
        Ok(())
    }

    fn progress(&self, outcome: &TickOutcome) {
        let tick = outcome.report.tick;
        if self.report_every == 0 || tick % self.report_every != 0 {
            return;
        }
        let snapshot = &outcome.snapshot;
        info!(
            "tick {}: {} spikes, {} delivered, {} thoughts, clarity {:.3}, attention {:.3}, mood {}",
            tick,
            outcome.report.spikes,
            outcome.report.delivered,
            snapshot.thoughts.len(),
            snapshot.consciousness.clarity,
            snapshot.attention.level,
            snapshot
                .dominant_emotion()
                .map(|e| e.name())
                .unwrap_or("calm")
        );
    }
}

fn print_summary(snapshot: &SimulationSnapshot) {
    println!("time: {}", snapshot.time);
    println!("neurons: {} ({} spiking)", snapshot.neurons.len(), snapshot.spiking_count());
    for region in &snapshot.regions {
        println!("  {:<12} activity {:+.4}", region.role, region.activity);
    }
    for emotion in &snapshot.emotions {
        println!("  {:<12} {:.3}", emotion.kind, emotion.level);
    }
    println!(
        "mood: {}",
        snapshot.dominant_emotion().map(|e| e.name()).unwrap_or("calm")
    );
    println!("clarity: {:.4}", snapshot.consciousness.clarity);
    println!(
        "focus: {} ({:.3})",
        snapshot.focus_text().unwrap_or("none"),
        snapshot.attention.level
    );
    println!("thoughts: {}", snapshot.thoughts.len());
    for thought in snapshot.oldest_thoughts(5) {
        println!("  [{}] {} ({:.3})", thought.label(), thought.text, thought.strength);
    }
}
