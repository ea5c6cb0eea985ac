use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use super::fetcher::PositionSource;
use super::history::HistoryStore;
use super::sample_log::SampleLog;

#[derive(Debug, Clone)]
pub struct PollerSettings {
    pub interval: Duration,
    pub sample_log: Option<SampleLog>,
}

#[derive(Debug)]
struct WorkerHandle {
    stop_tx: oneshot::Sender<()>,
    join: JoinHandle<()>,
}

/// Background sampling loop. Runs until [`Poller::stop`] is called or the
/// handle is dropped.
pub struct Poller {
    worker: Option<WorkerHandle>,
}

impl Poller {
    pub fn start<S: PositionSource>(
        source: Arc<S>,
        history: Arc<HistoryStore>,
        settings: PollerSettings,
    ) -> Self {
        let (stop_tx, stop_rx) = oneshot::channel();

        log::info!(
            "Starting poller (interval {:?}, capacity {})",
            settings.interval,
            history.capacity()
        );
        let join = tokio::spawn(run_poll_loop(source, history, settings, stop_rx));

        Self {
            worker: Some(WorkerHandle { stop_tx, join }),
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.join.is_finished())
    }

    pub async fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.stop_tx.send(());
            let _ = worker.join.await;
            log::info!("Poller stopped");
        }
    }
}

async fn run_poll_loop<S: PositionSource>(
    source: Arc<S>,
    history: Arc<HistoryStore>,
    settings: PollerSettings,
    mut stop_rx: oneshot::Receiver<()>,
) {
    loop {
        let record = tokio::select! {
            record = source.fetch_latest() => record,
            _ = &mut stop_rx => return,
        };

        if record.is_heartbeat() {
            log::debug!("Heartbeat at {}", record.timestamp_utc);
        } else {
            log::debug!("Sampled {:?}", record);
        }
        if let Some(sink) = &settings.sample_log {
            if let Err(e) = sink.append(&record) {
                log::warn!("Failed to write sample log: {}", e);
            }
        }
        history.append(record);

        let should_stop = tokio::select! {
            _ = sleep(settings.interval) => false,
            _ = &mut stop_rx => true,
        };
        if should_stop {
            return;
        }
    }
}
