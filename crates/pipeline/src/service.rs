//! Long-running watch loop: one check per trigger, never two passes at once.

use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

use crate::error::PassError;
use crate::orchestrator::{PassOutcome, Pipeline};

/// Drive `pipeline` from `trigger` until `shutdown` resolves.
///
/// Runs one check immediately (the startup pass), then one check per wake-up.
/// After a wake-up the loop waits `settle` so a burst of writes can finish
/// before the inputs are fingerprinted. Passes run inline on this task, so
/// shutdown is only observed between passes and an in-flight pass always
/// completes. Pass errors are logged and never end the loop.
pub async fn watch_loop<F>(
    pipeline: &mut Pipeline,
    trigger: Arc<Notify>,
    settle: Duration,
    shutdown: F,
) where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    check_inputs(pipeline);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("shutdown requested, leaving watch loop");
                break;
            }
            _ = trigger.notified() => {
                if !settle.is_zero() {
                    tokio::select! {
                        _ = &mut shutdown => {
                            info!("shutdown requested, leaving watch loop");
                            break;
                        }
                        _ = tokio::time::sleep(settle) => {}
                    }
                }
                check_inputs(pipeline);
            }
        }
    }

    let stats = pipeline.stats();
    info!(
        checks = stats.checks,
        passes = stats.passes_run,
        failed = stats.passes_failed,
        skipped = stats.passes_skipped,
        output_retries = stats.output_retries,
        "watch loop stopped"
    );
}

/// Install the stop-signal handlers and return a future that resolves once
/// one of them fires.
///
/// Handlers are registered before this returns, so a signal that lands
/// while the startup pass is still writing is held until the loop next
/// looks, instead of killing the process mid-write.
pub fn shutdown_signal() -> io::Result<impl Future<Output = ()>> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;
        Ok(async move {
            tokio::select! {
                _ = sigint.recv() => {}
                _ = sigterm.recv() => {}
            }
        })
    }

    #[cfg(not(unix))]
    {
        let mut ctrl_c = tokio::signal::windows::ctrl_c()?;
        Ok(async move {
            ctrl_c.recv().await;
        })
    }
}

/// One level-triggered check, with every pass error contained here.
fn check_inputs(pipeline: &mut Pipeline) {
    match pipeline.run_pass_if_changed() {
        Ok(PassOutcome::Completed(report)) => report.log_summary(),
        Ok(PassOutcome::Unchanged) => debug!("inputs unchanged, skipping pass"),
        Err(e @ PassError::MissingFile { .. }) => {
            warn!(error = %e, "input table missing, pass skipped")
        }
        Err(e) => error!(error = %e, "pricing pass failed"),
    }
}
