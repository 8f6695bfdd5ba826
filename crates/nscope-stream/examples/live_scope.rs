//! Run a scope over the built-in simulator and print buffer statistics.
//!
//!     cargo run --example live_scope

use anyhow::Result;
use nscope_simulation::{SimulatedSource, SimulatorConfig};
use nscope_stream::{Scope, ScopeCommand, ScopeDriver};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = SimulatorConfig::default();
    let stream_name = config.stream_name.clone();
    let source = SimulatedSource::new(config)?;

    let mut scope = Scope::new(source, &stream_name)?;
    scope.configure_bandpass(1.0, 40.0)?;

    let driver = ScopeDriver::new(scope, 20.0);
    let mut frames = driver.subscribe();
    let control = driver.control_handle();

    let driver_task = tokio::spawn(driver.run());

    control.send(ScopeCommand::SetBandpassEnabled(true)).await?;
    control.send(ScopeCommand::SetCarEnabled(true)).await?;

    for _ in 0..40 {
        let frame = frames.recv().await?;
        let peak = frame
            .data
            .iter()
            .flat_map(|row| row.iter())
            .fold(0.0f64, |acc, &x| acc.max(x.abs()));
        let edges = frame.trigger.iter().filter(|&&x| x != 0.0).count();
        tracing::info!(channels = frame.data.len(), peak, edges, "frame");
    }

    control.send(ScopeCommand::Shutdown).await?;
    driver_task.await??;
    Ok(())
}
