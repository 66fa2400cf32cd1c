//! Lifecycle supervisor - periodic reclaim and status reporting.
//!
//! Two independent tasks run for the life of the process:
//! - reclaim: sweeps connections that closed without a close event
//! - report: logs connection counts per role

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::hub::RelayHub;

/// Default interval between reclaim sweeps.
pub const DEFAULT_RECLAIM_INTERVAL: Duration = Duration::from_secs(30);

/// Default interval between status reports.
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(10);

/// Spawns and owns the periodic maintenance tasks.
pub struct LifecycleSupervisor {
    hub: Arc<RelayHub>,
    reclaim_interval: Duration,
    report_interval: Duration,
}

/// Handles to the running supervisor tasks.
pub struct SupervisorHandles {
    pub reclaim: JoinHandle<()>,
    pub report: JoinHandle<()>,
}

impl SupervisorHandles {
    /// Stop both tasks.
    pub fn abort(&self) {
        self.reclaim.abort();
        self.report.abort();
    }
}

impl LifecycleSupervisor {
    pub fn new(hub: Arc<RelayHub>, reclaim_interval: Duration, report_interval: Duration) -> Self {
        Self {
            hub,
            reclaim_interval,
            report_interval,
        }
    }

    /// Start both tasks on the current runtime.
    pub fn spawn(self) -> SupervisorHandles {
        let reclaim = tokio::spawn(run_reclaim(self.hub.clone(), self.reclaim_interval));
        let report = tokio::spawn(run_report(self.hub, self.report_interval));
        SupervisorHandles { reclaim, report }
    }
}

async fn run_reclaim(hub: Arc<RelayHub>, period: Duration) {
    let mut ticker = ticker(period);
    loop {
        ticker.tick().await;
        let reclaimed = hub.sweep().await;
        if reclaimed > 0 {
            tracing::debug!(reclaimed, "Swept stale connections");
        }
    }
}

async fn run_report(hub: Arc<RelayHub>, period: Duration) {
    let mut ticker = ticker(period);
    loop {
        ticker.tick().await;
        let counts = hub.report().await;
        tracing::info!(
            sensors = counts.sensors,
            browsers = counts.browsers,
            "Connected - Sensors: {}, Browsers: {}",
            counts.sensors,
            counts.browsers
        );
    }
}

// First tick fires one full period after start, like a plain repeating timer.
fn ticker(period: Duration) -> tokio::time::Interval {
    let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::RecordingPeerChannel;
    use crate::domain::relay::RoleCounts;

    #[tokio::test]
    async fn reclaim_task_sweeps_closed_connections() {
        let hub = Arc::new(RelayHub::default());
        let open = Arc::new(RecordingPeerChannel::new());
        let closed = Arc::new(RecordingPeerChannel::new());
        hub.connect(open.clone()).await;
        hub.connect(closed.clone()).await;
        closed.close();

        let handles = LifecycleSupervisor::new(
            hub.clone(),
            Duration::from_millis(20),
            Duration::from_secs(3600),
        )
        .spawn();
        tokio::time::sleep(Duration::from_millis(150)).await;
        handles.abort();

        assert_eq!(hub.report().await, RoleCounts { sensors: 0, browsers: 1 });
    }

    #[tokio::test]
    async fn reclaim_waits_one_period_before_first_sweep() {
        let hub = Arc::new(RelayHub::default());
        let closed = Arc::new(RecordingPeerChannel::new());
        hub.connect(closed.clone()).await;
        closed.close();

        let handles = LifecycleSupervisor::new(
            hub.clone(),
            Duration::from_secs(3600),
            Duration::from_secs(3600),
        )
        .spawn();
        tokio::time::sleep(Duration::from_millis(50)).await;
        handles.abort();

        assert_eq!(hub.report().await.browsers, 1);
    }

    #[tokio::test]
    async fn report_task_logs_role_counts() {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .finish();
        // Current-thread runtime: spawned tasks log through this default.
        let _guard = tracing::subscriber::set_default(subscriber);

        let hub = Arc::new(RelayHub::default());
        for _ in 0..2 {
            hub.connect(Arc::new(RecordingPeerChannel::new())).await;
        }
        let sensor = hub.connect(Arc::new(RecordingPeerChannel::new())).await;
        hub.handle_text(&sensor, r#"{"type":"sensor_data"}"#).await;

        let handles = LifecycleSupervisor::new(
            hub.clone(),
            Duration::from_secs(3600),
            Duration::from_millis(10),
        )
        .spawn();
        tokio::time::sleep(Duration::from_millis(60)).await;

        assert!(!handles.report.is_finished());
        handles.abort();
        let output = log.contents();
        assert!(
            output.contains("Connected - Sensors: 1, Browsers: 2"),
            "report not logged: {output}"
        );
    }

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<std::sync::Mutex<Vec<u8>>>);

    impl CapturedLog {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
