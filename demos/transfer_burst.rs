//! # Example: Transfer Burst
//!
//! Three devices, nine components, four concurrent users. Two uploads target
//! a full device and are unblocked by moves and removals issued by the other
//! users. Runs the same burst ten times on a fresh coordinator.
//!
//! ```text
//! DEV-1 cap 3: COMP-101 COMP-102 COMP-103
//! DEV-2 cap 3: COMP-104 COMP-105 COMP-106
//! DEV-3 cap 5: COMP-107 COMP-108 COMP-109
//! ```
//!
//! Run with: `RUST_LOG=info cargo run --example transfer_burst --features logging`

use std::{sync::Arc, time::Duration};

use slotvisor::{
    ComponentId, Coordinator, CoordinatorConfig, DeviceId, Layout, LogWriter, Subscribe,
    TransferFn, TransferRef,
};
use tracing_subscriber::EnvFilter;

fn setup() -> anyhow::Result<Arc<Coordinator>> {
    let dev = DeviceId::new;
    let comp = ComponentId::new;

    let layout = Layout::new(
        [(dev(1), 3), (dev(2), 3), (dev(3), 5)],
        [
            (comp(101), dev(1)),
            (comp(102), dev(1)),
            (comp(103), dev(1)),
            (comp(104), dev(2)),
            (comp(105), dev(2)),
            (comp(106), dev(2)),
            (comp(107), dev(3)),
            (comp(108), dev(3)),
            (comp(109), dev(3)),
        ],
    )?;

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter)];
    Ok(Coordinator::builder(layout)
        .with_config(CoordinatorConfig::default())
        .with_subscribers(subs)
        .build())
}

/// Transfer whose phases each take `work_ms`. Device 0 means "none".
fn transfer(component: u64, from: u64, to: u64, work_ms: u64) -> TransferRef {
    let device = |n: u64| (n > 0).then(|| DeviceId::new(n));
    let work = Duration::from_millis(work_ms);
    TransferFn::arc(
        ComponentId::new(component),
        device(from),
        device(to),
        move || async move {
            println!("  [prepare] COMP-{component}");
            tokio::time::sleep(work).await;
        },
        move || async move {
            println!("  [perform] COMP-{component}");
            tokio::time::sleep(work).await;
        },
    )
}

async fn burst(coord: &Arc<Coordinator>) -> anyhow::Result<()> {
    let pause = |ms| tokio::time::sleep(Duration::from_millis(ms));

    let (a, b, c, d) = tokio::join!(
        async {
            pause(10).await;
            coord.submit(transfer(101, 1, 3, 20)).await?;
            pause(30).await;
            coord.submit(transfer(105, 2, 0, 10)).await
        },
        coord.submit(transfer(110, 0, 1, 10)),
        async {
            coord.submit(transfer(109, 3, 2, 10)).await?;
            pause(30).await;
            coord.submit(transfer(102, 1, 0, 10)).await
        },
        coord.submit(transfer(107, 3, 1, 10)),
    );
    a?;
    b?;
    c?;
    d?;
    Ok(())
}

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    for round in 0..10 {
        let coord = setup()?;
        tokio::time::timeout(Duration::from_secs(5), burst(&coord)).await??;

        let snap = coord.snapshot().await;
        anyhow::ensure!(snap.is_within_capacity(), "round {round}: capacity exceeded");
        println!("round {round} done: {:?}", snap.devices);
    }
    Ok(())
}
