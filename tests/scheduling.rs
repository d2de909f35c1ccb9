mod common;

use chrono::Duration as ChronoDuration;
use claim_keeper::{ClaimCoordinator, ClaimOutcome, Wake};
use common::{assert_close, executor, schedule, t0, ScriptedClient, TokioClock};
use std::sync::Arc;
use std::time::Duration;

async fn advance(secs: u64) {
    tokio::time::sleep(Duration::from_secs(secs)).await;
}

#[tokio::test(start_paused = true)]
async fn fresh_token_claims_immediately_then_after_interval() {
    let dir = tempfile::tempdir().unwrap();
    let clock = TokioClock::new(t0());
    let client = Arc::new(ScriptedClient::new(clock.clone()));
    let (executor, ledger) = executor(client.clone(), &dir.path().join("claim_log.txt"), clock.clone());

    let coordinator = ClaimCoordinator::new(vec![42], schedule(28_800), executor, clock).unwrap();
    let handle = coordinator.start().await;

    assert_eq!(handle.decisions()[0].wake, Wake::Immediate);
    assert_eq!(client.calls_for(42), vec![t0()]);

    let history = ledger.history(42);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].outcome, ClaimOutcome::Success);
    assert_eq!(history[0].detail, "0xabc");

    advance(28_800 - 5).await;
    assert_eq!(client.calls_for(42).len(), 1);

    advance(10).await;
    let calls = client.calls_for(42);
    assert_eq!(calls.len(), 2);
    assert_close(calls[1], t0() + ChronoDuration::seconds(28_800));

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn restart_waits_for_due_time_from_log() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("claim_log.txt");
    std::fs::write(
        &log,
        "2024-01-01T00:00:00.000Z - Claim executed for TokenID: 7 - TX: 0xdef\n",
    )
    .unwrap();

    let clock = TokioClock::new(t0() + ChronoDuration::minutes(30));
    let client = Arc::new(ScriptedClient::new(clock.clone()));
    let (executor, _ledger) = executor(client.clone(), &log, clock.clone());

    let coordinator = ClaimCoordinator::new(vec![7], schedule(3_600), executor, clock).unwrap();
    let handle = coordinator.start().await;

    assert_eq!(
        handle.decisions()[0].wake,
        Wake::At(t0() + ChronoDuration::hours(1))
    );
    assert!(client.calls().is_empty());

    advance(1_800 - 5).await;
    assert!(client.calls().is_empty());

    advance(10).await;
    let calls = client.calls_for(7);
    assert_eq!(calls.len(), 1);
    assert_close(calls[0], t0() + ChronoDuration::hours(1));

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn overdue_token_claims_immediately_on_restart() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("claim_log.txt");
    std::fs::write(
        &log,
        "2024-01-01T00:00:00.000Z - Claim executed for TokenID: 7 - TX: 0xdef\n",
    )
    .unwrap();

    let clock = TokioClock::new(t0() + ChronoDuration::hours(20));
    let client = Arc::new(ScriptedClient::new(clock.clone()));
    let (executor, _ledger) = executor(client.clone(), &log, clock.clone());

    let coordinator = ClaimCoordinator::new(vec![7], schedule(3_600), executor, clock).unwrap();
    let handle = coordinator.start().await;

    assert_eq!(handle.decisions()[0].wake, Wake::Immediate);
    assert_eq!(client.calls_for(7), vec![t0() + ChronoDuration::hours(20)]);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn failure_retries_after_delay_without_touching_other_tokens() {
    let dir = tempfile::tempdir().unwrap();
    let clock = TokioClock::new(t0());
    let client = Arc::new(ScriptedClient::new(clock.clone()).failing(5));
    let (executor, ledger) = executor(client.clone(), &dir.path().join("claim_log.txt"), clock.clone());

    let coordinator =
        ClaimCoordinator::new(vec![5, 6], schedule(28_800), executor, clock).unwrap();
    let handle = coordinator.start().await;

    let failures = ledger.history(5);
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].outcome, ClaimOutcome::Failure);
    assert_eq!(ledger.history(6).len(), 1);
    assert!(ledger.last_success(6).is_some());

    // Never sooner than the retry delay
    advance(3_600 - 5).await;
    assert_eq!(client.calls_for(5).len(), 1);

    advance(10).await;
    let retries = client.calls_for(5);
    assert_eq!(retries.len(), 2);
    assert_close(retries[1], t0() + ChronoDuration::hours(1));
    assert_eq!(client.calls_for(6).len(), 1);

    // Token 6 keeps its own eight hour cadence
    advance(7 * 3_600).await;
    let calls_6 = client.calls_for(6);
    assert_eq!(calls_6.len(), 2);
    assert_close(calls_6[1], t0() + ChronoDuration::hours(8));

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn startup_pass_claims_in_declared_order_one_at_a_time() {
    let dir = tempfile::tempdir().unwrap();
    let clock = TokioClock::new(t0());
    let client = Arc::new(ScriptedClient::new(clock.clone()).with_latency(Duration::from_secs(10)));
    let (executor, _ledger) = executor(client.clone(), &dir.path().join("claim_log.txt"), clock.clone());

    let coordinator =
        ClaimCoordinator::new(vec![3, 1, 2], schedule(28_800), executor, clock).unwrap();
    let evaluated = coordinator.run_startup_pass().await;

    let order: Vec<_> = evaluated.iter().map(|(_, d)| d.token_id).collect();
    assert_eq!(order, vec![3, 1, 2]);

    let calls = client.calls();
    let called: Vec<_> = calls.iter().map(|(id, _)| *id).collect();
    assert_eq!(called, vec![3, 1, 2]);
    assert_close(calls[0].1, t0());
    assert_close(calls[1].1, t0() + ChronoDuration::seconds(10));
    assert_close(calls[2].1, t0() + ChronoDuration::seconds(20));
}

#[tokio::test(start_paused = true)]
async fn waiting_token_keeps_its_due_time_while_later_token_claims() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("claim_log.txt");
    std::fs::write(
        &log,
        "2024-01-01T00:00:00.000Z - Claim executed for TokenID: 1 - TX: 0xdef\n",
    )
    .unwrap();

    // Token 1 is due in 60s; token 2 has never claimed and its call hangs for 2000s
    let clock = TokioClock::new(t0() + ChronoDuration::seconds(3_540));
    let client = Arc::new(ScriptedClient::new(clock.clone()).with_latency(Duration::from_secs(2_000)));
    let (executor, _ledger) = executor(client.clone(), &log, clock.clone());

    let coordinator = ClaimCoordinator::new(vec![1, 2], schedule(3_600), executor, clock).unwrap();
    let handle = coordinator.start().await;

    let decisions = handle.decisions();
    assert_eq!(decisions[0].wake, Wake::At(t0() + ChronoDuration::hours(1)));
    assert_eq!(decisions[1].wake, Wake::Immediate);

    assert_close(client.calls_for(2)[0], t0() + ChronoDuration::seconds(3_540));
    let calls_1 = client.calls_for(1);
    assert_eq!(calls_1.len(), 1);
    assert_close(calls_1[0], t0() + ChronoDuration::hours(1));

    handle.shutdown().await;
}
