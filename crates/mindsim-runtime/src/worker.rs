//! Engine on a dedicated thread
//!
//! [`EngineHandle`] moves a [`SimulationEngine`] onto its own thread and
//! talks to it over channels. Requests are handled strictly in the order
//! they are sent, so a poke or damage sent before a tick request is applied
//! before that tick runs. At most one tick may be in flight per handle.

use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use crate::{
    error::*,
    region::RegionRole,
    simulation::{SimulationEngine, TickReport},
    snapshot::SimulationSnapshot,
};

enum Request {
    Tick { stimulus: f32, sleeping: bool },
    Stimulate { x: f32, y: f32 },
    Damage(RegionRole),
    Shutdown,
}

/// Result of one tick run on the worker
#[derive(Debug, Clone)]
pub struct TickOutcome {
    /// State after the tick
    pub snapshot: SimulationSnapshot,
    /// Counters for the tick
    pub report: TickReport,
}

/// Driver-side handle to an engine thread
#[derive(Debug)]
pub struct EngineHandle {
    requests: mpsc::Sender<Request>,
    ticks: mpsc::Receiver<TickOutcome>,
    control: mpsc::Receiver<Result<usize>>,
    in_flight: bool,
    worker: Option<JoinHandle<SimulationEngine>>,
}

impl EngineHandle {
    /// Move `engine` onto a new thread
    pub fn spawn(mut engine: SimulationEngine) -> Self {
        let (requests, rx) = mpsc::channel::<Request>();
        let (tick_tx, ticks) = mpsc::channel::<TickOutcome>();
        let (control_tx, control) = mpsc::channel::<Result<usize>>();

        let worker = thread::spawn(move || {
            while let Ok(request) = rx.recv() {
                let sent = match request {
                    Request::Tick { stimulus, sleeping } => {
                        let report = engine.step(stimulus, sleeping);
                        let snapshot = engine.snapshot();
                        tick_tx.send(TickOutcome { snapshot, report }).is_ok()
                    }
                    Request::Stimulate { x, y } => control_tx.send(engine.stimulate(x, y)).is_ok(),
                    Request::Damage(role) => control_tx.send(engine.damage(role)).is_ok(),
                    Request::Shutdown => break,
                };
                if !sent {
                    break;
                }
            }
            log::debug!("Engine worker stopping at tick {}", engine.time());
            engine
        });

        Self {
            requests,
            ticks,
            control,
            in_flight: false,
            worker: Some(worker),
        }
    }

    /// Ask for one tick; fails if the previous one has not been received
    pub fn request_tick(&mut self, stimulus: f32, sleeping: bool) -> Result<()> {
        if self.in_flight {
            return Err(RuntimeError::TickInFlight);
        }
        self.send(Request::Tick { stimulus, sleeping })?;
        self.in_flight = true;
        Ok(())
    }

    /// Whether a tick has been requested but not yet received
    pub fn is_tick_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Collect the pending tick if it has finished
    pub fn try_recv(&mut self) -> Result<Option<TickOutcome>> {
        match self.ticks.try_recv() {
            Ok(outcome) => {
                self.in_flight = false;
                Ok(Some(outcome))
            }
            Err(mpsc::TryRecvError::Empty) => Ok(None),
            Err(mpsc::TryRecvError::Disconnected) => Err(RuntimeError::WorkerDisconnected),
        }
    }

    /// Wait for the pending tick
    pub fn recv(&mut self) -> Result<TickOutcome> {
        if !self.in_flight {
            return Err(RuntimeError::invalid_input("no tick has been requested"));
        }
        let outcome = self.ticks.recv().map_err(|_| RuntimeError::WorkerDisconnected)?;
        self.in_flight = false;
        Ok(outcome)
    }

    /// Request a tick and wait for it
    pub fn tick_blocking(&mut self, stimulus: f32, sleeping: bool) -> Result<TickOutcome> {
        self.request_tick(stimulus, sleeping)?;
        self.recv()
    }

    /// Poke the network at `(x, y)`; see [`SimulationEngine::stimulate`]
    pub fn stimulate(&mut self, x: f32, y: f32) -> Result<usize> {
        self.send(Request::Stimulate { x, y })?;
        self.control.recv().map_err(|_| RuntimeError::WorkerDisconnected)?
    }

    /// Damage a region; see [`SimulationEngine::damage`]
    pub fn damage(&mut self, role: RegionRole) -> Result<usize> {
        self.send(Request::Damage(role))?;
        self.control.recv().map_err(|_| RuntimeError::WorkerDisconnected)?
    }

    /// Stop the worker and take the engine back
    pub fn shutdown(mut self) -> Result<SimulationEngine> {
        self.stop()
    }

    fn send(&self, request: Request) -> Result<()> {
        self.requests.send(request).map_err(|_| RuntimeError::WorkerDisconnected)
    }

    fn stop(&mut self) -> Result<SimulationEngine> {
        let worker = self.worker.take().ok_or(RuntimeError::WorkerDisconnected)?;
        // A worker that already exited has dropped its receiver; joining still works
        let _ = self.requests.send(Request::Shutdown);
        worker.join().map_err(|_| RuntimeError::WorkerDisconnected)
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        if self.worker.is_some() {
            let _ = self.stop();
        }
    }
}
