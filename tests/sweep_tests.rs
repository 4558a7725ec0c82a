use lanwarden::sweep::Sweeper;
use std::collections::BTreeSet;
use std::net::IpAddr;
use std::sync::Arc;
use test_utils::MockProber;


fn addresses(count: u8) -> Vec<IpAddr> {
    (1..=count)
        .map(|i| format!("10.0.0.{}", i).parse().unwrap())
        .collect()
}

#[tokio::test]
async fn test_sweep_returns_exactly_the_reachable_set() {
    let prober = Arc::new(MockProber::new());
    prober.set_reachable("10.0.0.2", true);
    prober.set_reachable("10.0.0.5", true);
    prober.set_reachable("10.0.0.9", true);

    let sweeper = Sweeper::new(prober, 8);
    let result = sweeper.sweep(&addresses(10)).await;

    let expected: BTreeSet<IpAddr> = ["10.0.0.2", "10.0.0.5", "10.0.0.9"]
        .iter()
        .map(|s| s.parse().unwrap())
        .collect();
    assert_eq!(result, expected);
}

#[tokio::test]
async fn test_probe_errors_are_treated_as_unreachable() {
    let prober = Arc::new(MockProber::new());
    prober.set_reachable("10.0.0.1", true);
    prober.set_failing("10.0.0.2");
    prober.set_failing("10.0.0.3");

    let sweeper = Sweeper::new(prober, 4);
    let result = sweeper.sweep(&addresses(4)).await;

    // The failing hosts are excluded but the sweep still completes
    assert_eq!(result.len(), 1);
    assert!(result.contains(&"10.0.0.1".parse::<IpAddr>().unwrap()));
}

#[tokio::test]
async fn test_result_independent_of_concurrency_cap() {
    let reachable = ["10.0.0.3", "10.0.0.7", "10.0.0.11", "10.0.0.20"];

    let serial_prober = Arc::new(MockProber::new());
    let parallel_prober = Arc::new(MockProber::new());
    for ip in reachable {
        serial_prober.set_reachable(ip, true);
        parallel_prober.set_reachable(ip, true);
    }

    // Fully serial vs the default cap over the same inputs
    let serial = Sweeper::new(serial_prober, 1).sweep(&addresses(25)).await;
    let parallel = Sweeper::new(parallel_prober, 50).sweep(&addresses(25)).await;

    assert_eq!(serial, parallel);
    assert_eq!(serial.len(), 4);
}

#[tokio::test]
async fn test_concurrency_cap_is_a_hard_ceiling() {
    let prober = Arc::new(MockProber::new());
    for i in 1..=30u8 {
        prober.set_reachable(&format!("10.0.0.{}", i), true);
    }

    let sweeper = Sweeper::new(prober.clone(), 5);
    let result = sweeper.sweep(&addresses(30)).await;

    assert_eq!(result.len(), 30);
    assert!(
        prober.max_concurrent_probes() <= 5,
        "observed {} probes in flight with a cap of 5",
        prober.max_concurrent_probes()
    );
}

#[tokio::test]
async fn test_serial_sweep_runs_one_probe_at_a_time() {
    let prober = Arc::new(MockProber::new());
    let sweeper = Sweeper::new(prober.clone(), 1);
    sweeper.sweep(&addresses(10)).await;
    assert_eq!(prober.max_concurrent_probes(), 1);
}

#[tokio::test]
async fn test_empty_range() {
    let prober = Arc::new(MockProber::new());
    let sweeper = Sweeper::new(prober, 50);
    assert!(sweeper.sweep(&[]).await.is_empty());
}

#[tokio::test]
async fn test_sweep_subnet_rejects_malformed_cidr() {
    let prober = Arc::new(MockProber::new());
    let sweeper = Sweeper::new(prober, 50);
    assert!(sweeper.sweep_subnet("not-a-subnet").await.is_err());
    assert!(sweeper.sweep_subnet("192.168.1.5").await.is_err());
}
