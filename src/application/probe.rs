//! Fixed-cadence health probe.
//!
//! Independent of the workload: every interval it runs the liveness query on
//! its own session and feeds the outcome to the shared outage tracker. It
//! never touches the insert/select counters.

use std::time::Duration;

use tracing::{debug, info, warn};

use super::context::RunContext;
use super::handle::ReconnectingHandle;
use crate::error::Error;
use crate::port::LIVENESS_QUERY;

/// Liveness probe task.
pub struct HealthProbe {
    handle: ReconnectingHandle,
    interval: Duration,
    ctx: RunContext,
}

impl HealthProbe {
    pub fn new(handle: ReconnectingHandle, interval: Duration, ctx: RunContext) -> Self {
        Self {
            handle,
            interval,
            ctx,
        }
    }

    /// Probe until the stop signal is observed, then close the session.
    pub async fn run(self) {
        info!(interval_ms = self.interval.as_millis() as u64, "Health probe started");

        while !self.ctx.stop.is_set() {
            match self.handle.acquire().await {
                Ok(session) => match session.query(LIVENESS_QUERY, &[]).await {
                    Ok(_) => {
                        self.ctx.outage.record_success();
                    }
                    Err(e) if e.is_connectivity() => {
                        self.ctx.outage.record_failure();
                        debug!(error = %e, "Probe lost connectivity");
                        session.close().await;
                        drop(session);
                        if let Err(Error::Stopped) = self.handle.force_reconnect().await {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "Probe query failed");
                    }
                },
                Err(Error::Stopped) => break,
                Err(e) => {
                    warn!(error = %e, "Probe failed to acquire session");
                    break;
                }
            }

            if self.ctx.stop.sleep(self.interval).await {
                break;
            }
        }

        self.handle.close().await;
        debug!("Health probe stopped");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::StopReason;
    use crate::infrastructure::config::ReconnectionConfig;
    use crate::testkit::{DownWindow, FakeBackend};

    fn probe(backend: &FakeBackend, ctx: &RunContext) -> HealthProbe {
        let handle = ReconnectingHandle::new(
            "probe",
            backend.connector(),
            ReconnectionConfig::default(),
            ctx.stop.clone(),
        )
        .with_outage_tracker(Arc::clone(&ctx.outage));
        HealthProbe::new(handle, Duration::from_secs(1), ctx.clone())
    }

    fn stop_after(ctx: &RunContext, after: Duration) {
        let stop = ctx.stop.clone();
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            stop.trigger(StopReason::DurationElapsed);
        });
    }

    #[tokio::test(start_paused = true)]
    async fn probes_once_per_interval() {
        let backend = FakeBackend::healthy();
        let ctx = RunContext::new();
        stop_after(&ctx, Duration::from_millis(4500));

        probe(&backend, &ctx).run().await;

        let probes = backend
            .statements()
            .iter()
            .filter(|sql| sql.as_str() == LIVENESS_QUERY)
            .count();
        // Ticks at 0..=4s; every tick after the first also runs the liveness check in acquire.
        assert_eq!(probes, 9);
        assert_eq!(ctx.stats.snapshot(), Default::default());
        assert_eq!(ctx.outage.snapshot().outages, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn measures_outage_window() {
        let backend = FakeBackend::with_outages(vec![DownWindow::between(
            Duration::from_millis(2500),
            Duration::from_millis(5500),
        )]);
        let ctx = RunContext::new();
        stop_after(&ctx, Duration::from_secs(10));

        probe(&backend, &ctx).run().await;
        ctx.outage.flush();

        let outage = ctx.outage.snapshot();
        assert_eq!(outage.outages, 1);
        // Detected at the 3s tick; reconnect attempts at 3, 3.5, 4.5, 6.5 succeed at 6.5.
        assert!(
            (3.0..=4.0).contains(&outage.total_outage_secs),
            "outage lasted {}s",
            outage.total_outage_secs
        );
    }

    #[tokio::test(start_paused = true)]
    async fn unreachable_backend_keeps_outage_open() {
        let backend = FakeBackend::unreachable();
        let ctx = RunContext::new();
        stop_after(&ctx, Duration::from_secs(3));

        probe(&backend, &ctx).run().await;

        assert!(ctx.outage.is_open());
        assert!(ctx.outage.flush());
        let outage = ctx.outage.snapshot();
        assert_eq!(outage.outages, 1);
        assert!((outage.total_outage_secs - 3.0).abs() < 1e-6);
    }
}
