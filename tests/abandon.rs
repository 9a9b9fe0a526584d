use std::process::Command;
use std::time::Duration;

use slotvisor::{ComponentId, Coordinator, CoordinatorConfig, DeviceId, Layout, TransferFn};

const CHILD_ENV: &str = "SLOTVISOR_ABANDON_CHILD";
const TEST_NAME: &str = "dropping_a_parked_submit_aborts_the_process";

/// Parks an ADD on a full device, then drops its future by timing it out.
fn abandon_parked_add() {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap();

    rt.block_on(async {
        let (d1, a, z) = (DeviceId::new(1), ComponentId::new(1), ComponentId::new(26));
        let layout = Layout::new([(d1, 1)], [(a, d1)]).unwrap();
        let coord = Coordinator::new(layout, CoordinatorConfig::default());

        let add = TransferFn::arc(z, None, Some(d1), || async {}, || async {});
        let res = tokio::time::timeout(Duration::from_millis(50), coord.submit(add)).await;
        assert!(res.is_err(), "ADD onto a full device must stay parked");
    });
}

#[test]
fn dropping_a_parked_submit_aborts_the_process() {
    if std::env::var_os(CHILD_ENV).is_some() {
        abandon_parked_add();
        println!("SURVIVED");
        return;
    }

    let out = Command::new(std::env::current_exe().unwrap())
        .args([TEST_NAME, "--exact", "--nocapture", "--test-threads=1"])
        .env(CHILD_ENV, "1")
        .output()
        .unwrap();

    assert!(!out.status.success(), "child exited cleanly: {:?}", out.status);
    assert!(!String::from_utf8_lossy(&out.stdout).contains("SURVIVED"));

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        assert_eq!(out.status.signal(), Some(6), "expected SIGABRT, got {:?}", out.status);
    }
}
