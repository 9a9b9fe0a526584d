#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use slotvisor::{
    ComponentId, Coordinator, CoordinatorConfig, DeviceId, Layout, Transfer, TransferError,
    TransferRef,
};
use tokio::sync::Notify;

pub const DEADLINE: Duration = Duration::from_secs(10);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    PrepareStart,
    PrepareEnd,
    PerformStart,
    PerformEnd,
}

/// Shared record of what the probes observed.
///
/// `physical` counts components that are really on a device: a component
/// leaves its source when `prepare` ends and lands on its destination when
/// `perform` starts.
pub struct Journal {
    steps: Mutex<Vec<(ComponentId, Step)>>,
    physical: Mutex<HashMap<DeviceId, usize>>,
    capacity: HashMap<DeviceId, usize>,
    violations: AtomicUsize,
}

impl Journal {
    pub fn new(caps: &[(DeviceId, usize)], placed: &[(ComponentId, DeviceId)]) -> Arc<Self> {
        let mut physical: HashMap<DeviceId, usize> = caps.iter().map(|(d, _)| (*d, 0)).collect();
        for (_, d) in placed {
            *physical.entry(*d).or_default() += 1;
        }
        Arc::new(Self {
            steps: Mutex::new(Vec::new()),
            physical: Mutex::new(physical),
            capacity: caps.iter().copied().collect(),
            violations: AtomicUsize::new(0),
        })
    }

    fn record(&self, c: ComponentId, step: Step) {
        self.steps.lock().unwrap().push((c, step));
    }

    fn leave(&self, d: DeviceId) {
        let mut phys = self.physical.lock().unwrap();
        let n = phys.entry(d).or_default();
        *n = n.saturating_sub(1);
    }

    fn arrive(&self, d: DeviceId) {
        let mut phys = self.physical.lock().unwrap();
        let n = phys.entry(d).or_default();
        *n += 1;
        if *n > self.capacity.get(&d).copied().unwrap_or(0) {
            self.violations.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn flag(&self) {
        self.violations.fetch_add(1, Ordering::SeqCst);
    }

    pub fn violations(&self) -> usize {
        self.violations.load(Ordering::SeqCst)
    }

    pub fn position(&self, c: ComponentId, step: Step) -> Option<usize> {
        self.steps
            .lock()
            .unwrap()
            .iter()
            .position(|(cc, s)| *cc == c && *s == step)
    }

    pub fn steps_of(&self, c: ComponentId) -> Vec<Step> {
        self.steps
            .lock()
            .unwrap()
            .iter()
            .filter(|(cc, _)| *cc == c)
            .map(|(_, s)| *s)
            .collect()
    }

    pub fn physical(&self, d: DeviceId) -> usize {
        self.physical.lock().unwrap().get(&d).copied().unwrap_or(0)
    }
}

/// Instrumented transfer: records its steps, tracks physical occupancy and
/// checks the ledger from inside both phases.
pub struct Probe {
    component: ComponentId,
    source: Option<DeviceId>,
    destination: Option<DeviceId>,
    coord: Arc<Coordinator>,
    journal: Arc<Journal>,
    delay: Duration,
    hold_prepare: Option<Arc<Notify>>,
    hold_perform: Option<Arc<Notify>>,
}

impl Probe {
    pub fn new(
        coord: &Arc<Coordinator>,
        journal: &Arc<Journal>,
        component: ComponentId,
        source: Option<DeviceId>,
        destination: Option<DeviceId>,
    ) -> Self {
        Self {
            component,
            source,
            destination,
            coord: Arc::clone(coord),
            journal: Arc::clone(journal),
            delay: Duration::ZERO,
            hold_prepare: None,
            hold_perform: None,
        }
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// `prepare` blocks until the returned notify fires.
    pub fn held_in_prepare(mut self) -> (Self, Arc<Notify>) {
        let n = Arc::new(Notify::new());
        self.hold_prepare = Some(Arc::clone(&n));
        (self, n)
    }

    /// `perform` blocks until the returned notify fires.
    pub fn held_in_perform(mut self) -> (Self, Arc<Notify>) {
        let n = Arc::new(Notify::new());
        self.hold_perform = Some(Arc::clone(&n));
        (self, n)
    }

    pub fn arc(self) -> TransferRef {
        Arc::new(self)
    }

    async fn check_ledger(&self) {
        if !self.coord.snapshot().await.is_within_capacity() {
            self.journal.flag();
        }
    }
}

#[async_trait]
impl Transfer for Probe {
    fn component(&self) -> ComponentId {
        self.component
    }

    fn source(&self) -> Option<DeviceId> {
        self.source
    }

    fn destination(&self) -> Option<DeviceId> {
        self.destination
    }

    async fn prepare(&self) {
        self.journal.record(self.component, Step::PrepareStart);
        self.check_ledger().await;
        if let Some(n) = &self.hold_prepare {
            n.notified().await;
        }
        tokio::time::sleep(self.delay).await;
        if let Some(from) = self.source {
            self.journal.leave(from);
        }
        self.journal.record(self.component, Step::PrepareEnd);
    }

    async fn perform(&self) {
        if let Some(to) = self.destination {
            self.journal.arrive(to);
        }
        self.journal.record(self.component, Step::PerformStart);
        self.check_ledger().await;
        if let Some(n) = &self.hold_perform {
            n.notified().await;
        }
        tokio::time::sleep(self.delay).await;
        self.check_ledger().await;
        self.journal.record(self.component, Step::PerformEnd);
    }
}

pub fn c(n: u64) -> ComponentId {
    ComponentId::new(n)
}

pub fn d(n: u64) -> DeviceId {
    DeviceId::new(n)
}

pub fn setup(
    caps: &[(DeviceId, usize)],
    placed: &[(ComponentId, DeviceId)],
) -> (Arc<Coordinator>, Arc<Journal>) {
    let layout = Layout::new(caps.iter().copied(), placed.iter().copied()).unwrap();
    let coord = Coordinator::new(layout, CoordinatorConfig::default());
    (coord, Journal::new(caps, placed))
}

pub fn spawn_submit(
    coord: &Arc<Coordinator>,
    t: TransferRef,
) -> tokio::task::JoinHandle<Result<(), TransferError>> {
    let coord = Arc::clone(coord);
    tokio::spawn(async move { coord.submit(t).await })
}

/// Polls until `cond` holds or the deadline passes.
pub async fn eventually<F, Fut>(mut cond: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    tokio::time::timeout(DEADLINE, async {
        while !cond().await {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("condition not reached before deadline");
}
