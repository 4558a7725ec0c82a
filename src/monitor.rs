use crate::config::ControllerConfig;
use crate::fingerprint::Fingerprinter;
use crate::model::Reachability;
use crate::probe::Prober;
use crate::registry::{ApplyOutcome, Registry};
use crate::sweep::Sweeper;
use futures::stream::{self, StreamExt};
use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Idle,
    Running,
}

/// Background loop that keeps the registry reconciled with the live network.
///
/// Each cycle re-probes every known device (status only), then sweeps the
/// configured subnet for newcomers and fingerprints them. Errors inside a
/// cycle are logged and contained; only an explicit `stop` leaves the Running
/// state, observed within one polling interval. In-flight probes for the
/// current cycle are allowed to finish.
pub struct Monitor {
    registry: Arc<Registry>,
    prober: Arc<dyn Prober>,
    config: ControllerConfig,
    running: Arc<AtomicBool>,
    stop_signal: Arc<Notify>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Monitor {
    pub fn new(registry: Arc<Registry>, prober: Arc<dyn Prober>, config: ControllerConfig) -> Self {
        Self {
            registry,
            prober,
            config,
            running: Arc::new(AtomicBool::new(false)),
            stop_signal: Arc::new(Notify::new()),
            handle: Mutex::new(None),
        }
    }

    pub fn state(&self) -> MonitorState {
        if self.running.load(Ordering::SeqCst) {
            MonitorState::Running
        } else {
            MonitorState::Idle
        }
    }

    /// Transition Idle → Running and spawn the monitoring loop.
    /// A no-op when already running.
    pub async fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        let ctx = LoopContext {
            registry: self.registry.clone(),
            prober: self.prober.clone(),
            config: self.config.clone(),
            running: self.running.clone(),
            stop_signal: self.stop_signal.clone(),
        };
        let task = tokio::spawn(run_loop(ctx));
        *self.handle.lock().await = Some(task);
        tracing::info!(
            interval_secs = self.config.monitoring_interval_secs,
            subnet = %self.config.default_subnet,
            "Monitoring started"
        );
    }

    /// Transition Running → Idle and wait for the loop to wind down.
    /// The flag is checked once per cycle, so the current iteration finishes
    /// its in-flight probes before the task exits.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        self.stop_signal.notify_one();
        if let Some(task) = self.handle.lock().await.take() {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "Monitoring task panicked");
            }
        }
        tracing::info!("Monitoring stopped");
    }
}

struct LoopContext {
    registry: Arc<Registry>,
    prober: Arc<dyn Prober>,
    config: ControllerConfig,
    running: Arc<AtomicBool>,
    stop_signal: Arc<Notify>,
}

async fn run_loop(ctx: LoopContext) {
    let interval = Duration::from_secs(ctx.config.monitoring_interval_secs.max(1));

    loop {
        if !ctx.running.load(Ordering::SeqCst) {
            break;
        }

        run_cycle(&ctx).await;

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = ctx.stop_signal.notified() => {}
        }
    }
}

/// One monitoring iteration: status re-probe of known devices, then a sweep
/// for newcomers. Nothing in here terminates the loop.
async fn run_cycle(ctx: &LoopContext) {
    refresh_known_devices(ctx).await;

    let sweeper = Sweeper::new(ctx.prober.clone(), ctx.config.max_threads);
    let live = match sweeper.sweep_subnet(&ctx.config.default_subnet).await {
        Ok(live) => live,
        Err(e) => {
            tracing::error!(error = %e, "Sweep failed, skipping new-device check");
            return;
        }
    };

    let fingerprinter = Fingerprinter::new(
        ctx.prober.clone(),
        ctx.config.probe_ports.clone(),
        ctx.config.max_threads,
    );

    for address in live {
        // Compared against all known addresses, online or offline: a device
        // that went dark and came back raises StatusChanged, never Added
        if ctx.registry.contains(address).await {
            continue;
        }
        let record = fingerprinter.fingerprint(address).await;
        let outcome = ctx.registry.apply(record).await;
        if outcome == ApplyOutcome::Added && ctx.config.security_settings.alert_on_new_devices {
            tracing::warn!(%address, "ALERT: new device detected");
        }
    }
}

/// Re-probe every registered address, status-only. Reachable hosts get their
/// status and `last_seen` refreshed; unreachable ones are marked offline,
/// never deleted.
async fn refresh_known_devices(ctx: &LoopContext) {
    let known: Vec<IpAddr> = ctx
        .registry
        .list()
        .await
        .into_iter()
        .map(|record| record.address)
        .collect();

    let results: Vec<(IpAddr, bool)> = stream::iter(known)
        .map(|address| {
            let prober = ctx.prober.clone();
            async move {
                let up = matches!(prober.probe(address).await, Ok(Reachability::Reachable));
                (address, up)
            }
        })
        .buffer_unordered(ctx.config.max_threads.max(1))
        .collect()
        .await;

    for (address, up) in results {
        if up {
            ctx.registry.mark_online(address).await;
        } else {
            ctx.registry.mark_offline(address).await;
        }
    }
}
