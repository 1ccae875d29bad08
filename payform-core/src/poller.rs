//! Status polling for a submitted payment.
//!
//! One background task per status page queries the payment service, waits a
//! fixed interval and asks again until the payment resolves to `ok` or `fail`.
//! Queries are strictly sequential. A failed query stops polling for good.
//! Dropping the poller aborts the task, so no query fires after teardown.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::gateway::PaymentGateway;
use crate::types::{PaymentStatus, Pid};
use crate::view::StatusView;

/// Wait between two status queries.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

const POLLING_ABORTED: &str = "status polling ended without a result";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollState {
    Status(PaymentStatus),
    /// A query failed; carries the cause. Polling does not resume.
    Halted(String),
}

impl PollState {
    pub fn is_final(&self) -> bool {
        match self {
            PollState::Status(status) => status.is_terminal(),
            PollState::Halted(_) => true,
        }
    }
}

impl Default for PollState {
    fn default() -> Self {
        PollState::Status(PaymentStatus::Processing)
    }
}

pub struct StatusPoller {
    pid: Pid,
    state: watch::Receiver<PollState>,
    task: JoinHandle<()>,
}

impl StatusPoller {
    /// Spawn the polling task. The first query is issued right away.
    pub fn start<G>(gateway: Arc<G>, pid: Pid, interval: Duration) -> Self
    where
        G: PaymentGateway + ?Sized + 'static,
    {
        let (tx, rx) = watch::channel(PollState::default());
        tracing::info!(%pid, interval_ms = interval.as_millis() as u64, "status polling started");
        let task = tokio::spawn(poll_until_final(gateway, pid.clone(), interval, tx));
        Self {
            pid,
            state: rx,
            task,
        }
    }

    pub fn pid(&self) -> &Pid {
        &self.pid
    }

    pub fn state(&self) -> PollState {
        self.state.borrow().clone()
    }

    pub fn view(&self) -> StatusView {
        StatusView::for_state(&self.state.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<PollState> {
        self.state.clone()
    }

    /// Resolve once the payment is terminal or polling halted. A task that
    /// ends without a final state counts as halted.
    pub async fn wait_final(&mut self) -> PollState {
        let result = self
            .state
            .wait_for(PollState::is_final)
            .await
            .map(|state| state.clone());
        match result {
            Ok(state) => state,
            Err(_) => {
                let last = self.state.borrow().clone();
                if last.is_final() {
                    last
                } else {
                    tracing::warn!(pid = %self.pid, "status polling ended without a result");
                    PollState::Halted(POLLING_ABORTED.to_string())
                }
            }
        }
    }

    /// Tear the poller down. Same as dropping it.
    pub fn stop(self) {}
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        if !self.task.is_finished() {
            tracing::debug!(pid = %self.pid, "status polling cancelled");
        }
        self.task.abort();
    }
}

async fn poll_until_final<G>(
    gateway: Arc<G>,
    pid: Pid,
    interval: Duration,
    state: watch::Sender<PollState>,
) where
    G: PaymentGateway + ?Sized,
{
    let mut attempt: u64 = 0;
    loop {
        attempt += 1;
        match gateway.check_status(&pid).await {
            Ok(report) => {
                let status = report.payment_status();
                tracing::debug!(%pid, attempt, status = status.as_str(), "status received");
                if status.is_terminal() {
                    tracing::info!(%pid, attempt, status = status.as_str(), "payment resolved");
                    state.send_replace(PollState::Status(status));
                    return;
                }
            }
            Err(err) => {
                tracing::warn!(%pid, attempt, error = %err, "status check failed, polling stopped");
                state.send_replace(PollState::Halted(err.to_string()));
                return;
            }
        }
        tokio::time::sleep(interval).await;
    }
}

/// The `/{pid}` page: either an invalid parameter notice or a live poller.
pub enum StatusPage {
    InvalidParam,
    Tracking(StatusPoller),
}

impl StatusPage {
    /// Open the page for a routed pid. A missing or empty pid starts nothing.
    pub fn open<G>(gateway: Arc<G>, pid: Option<&str>, interval: Duration) -> Self
    where
        G: PaymentGateway + ?Sized + 'static,
    {
        match pid.and_then(Pid::new) {
            Some(pid) => StatusPage::Tracking(StatusPoller::start(gateway, pid, interval)),
            None => {
                tracing::warn!("status page opened without a payment identifier");
                StatusPage::InvalidParam
            }
        }
    }

    pub fn view(&self) -> StatusView {
        match self {
            StatusPage::InvalidParam => StatusView::InvalidParam,
            StatusPage::Tracking(poller) => poller.view(),
        }
    }

    /// Wait for the view that ends the page.
    pub async fn wait_final(&mut self) -> StatusView {
        match self {
            StatusPage::InvalidParam => StatusView::InvalidParam,
            StatusPage::Tracking(poller) => StatusView::for_state(&poller.wait_final().await),
        }
    }
}
