//! Async driver that runs a scope's update cycle on a fixed cadence and
//! fans conditioned frames out to subscribers.

use crate::conditioning::EegConditioning;
use crate::scope::Scope;
use nscope_core::{AcquisitionSource, ScopeResult};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};

const FRAME_CHANNEL_CAPACITY: usize = 32;
const COMMAND_CHANNEL_CAPACITY: usize = 32;

/// Control messages accepted while the driver runs.
#[derive(Debug, Clone)]
pub enum ScopeCommand {
    Start,
    Stop,
    SetBandpassEnabled(bool),
    SetCarEnabled(bool),
    SetSelectedChannels(Vec<usize>),
    ConfigureBandpass { low_hz: f64, high_hz: f64 },
    Shutdown,
}

/// Snapshot of the scope buffers published after each update cycle.
#[derive(Debug, Clone)]
pub struct ScopeFrame {
    /// One row per data channel, oldest sample first.
    pub data: Vec<Vec<f64>>,
    pub trigger: Vec<f64>,
}

/// Owns a [`Scope`] and drives it from a tokio interval.
///
/// Subscribers receive frames over a broadcast channel; slow subscribers lag
/// and drop old frames rather than stalling the update cycle.
pub struct ScopeDriver<S: AcquisitionSource> {
    scope: Scope<S, EegConditioning>,
    refresh_hz: f64,
    frame_sender: broadcast::Sender<ScopeFrame>,
    command_sender: mpsc::Sender<ScopeCommand>,
    command_receiver: mpsc::Receiver<ScopeCommand>,
}

impl<S: AcquisitionSource> ScopeDriver<S> {
    pub fn new(scope: Scope<S, EegConditioning>, refresh_hz: f64) -> Self {
        let (frame_sender, _) = broadcast::channel(FRAME_CHANNEL_CAPACITY);
        let (command_sender, command_receiver) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        ScopeDriver {
            scope,
            refresh_hz: refresh_hz.max(1.0),
            frame_sender,
            command_sender,
            command_receiver,
        }
    }

    /// Receiver for conditioned frames. May be called any number of times
    /// before or after `run` starts.
    pub fn subscribe(&self) -> broadcast::Receiver<ScopeFrame> {
        self.frame_sender.subscribe()
    }

    /// Handle for sending [`ScopeCommand`]s from other tasks.
    pub fn control_handle(&self) -> mpsc::Sender<ScopeCommand> {
        self.command_sender.clone()
    }

    /// Drive the scope until a `Shutdown` command arrives or every control
    /// handle is dropped. A failed update cycle is logged and skipped; the
    /// cadence is preserved.
    pub async fn run(mut self) -> ScopeResult<()> {
        let period = Duration::from_secs_f64(1.0 / self.refresh_hz);
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut running = true;

        tracing::info!(
            stream = self.scope.stream_name(),
            refresh_hz = self.refresh_hz,
            "scope driver started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if !running {
                        continue;
                    }
                    match self.scope.update() {
                        Ok(()) => {
                            let frame = ScopeFrame {
                                data: self.scope.data_snapshot(),
                                trigger: self.scope.trigger_snapshot(),
                            };
                            // no subscribers is fine
                            let _ = self.frame_sender.send(frame);
                        }
                        Err(err) => {
                            tracing::warn!(error = %err, "update cycle failed");
                        }
                    }
                }
                command = self.command_receiver.recv() => {
                    match command {
                        Some(ScopeCommand::Start) => running = true,
                        Some(ScopeCommand::Stop) => running = false,
                        Some(ScopeCommand::SetBandpassEnabled(enabled)) => {
                            self.scope.set_apply_bandpass(enabled);
                        }
                        Some(ScopeCommand::SetCarEnabled(enabled)) => {
                            self.scope.set_apply_car(enabled);
                        }
                        Some(ScopeCommand::SetSelectedChannels(channels)) => {
                            self.scope.set_selected_channels(channels);
                        }
                        Some(ScopeCommand::ConfigureBandpass { low_hz, high_hz }) => {
                            if let Err(err) = self.scope.configure_bandpass(low_hz, high_hz) {
                                tracing::warn!(error = %err, "band-pass rejected");
                            }
                        }
                        Some(ScopeCommand::Shutdown) | None => break,
                    }
                }
            }
        }

        tracing::info!(stream = self.scope.stream_name(), "scope driver stopped");
        Ok(())
    }
}
