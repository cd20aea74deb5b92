use super::*;
use steal_finder::scheduler::PollScheduler;

#[tokio::test]
async fn test_failing_watch_does_not_stop_the_cycle() -> anyhow::Result<()> {
    let broken = page_server("/bikes", 500, "upstream down").await;
    let healthy = page_server("/bikes", 200, BIKES_PAGE).await;
    let harness = TestHarness::new().await?;

    let mut first = bike_watch(&broken, "/bikes");
    first.name = "Broken shop".to_string();
    let second = bike_watch(&healthy, "/bikes");

    let scheduler = PollScheduler::new(
        harness.runner.clone(),
        vec![first, second],
        Duration::from_secs(60),
    );
    let report = scheduler.run_cycle().await;

    assert_eq!(report.watches.len(), 2);
    assert_eq!(report.failed_watches, 1);
    assert_eq!(report.watches[0].watch, "Broken shop");
    assert!(!report.watches[0].success);
    assert!(report.watches[1].success);
    assert_eq!(report.notifications_sent, 1);
    assert_eq!(harness.notifier.sent().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_spawned_cycle_reports_back() -> anyhow::Result<()> {
    let server = page_server("/bikes", 200, BIKES_PAGE).await;
    let harness = TestHarness::new().await?;
    let scheduler = PollScheduler::new(
        harness.runner.clone(),
        vec![bike_watch(&server, "/bikes")],
        Duration::from_secs(60),
    );

    let handle = scheduler.try_start_cycle().expect("no cycle running yet");
    let report = handle.await?;

    assert_eq!(report.notifications_sent, 1);
    assert!(!scheduler.is_cycle_running());
    assert_eq!(scheduler.stats().cycles_completed, 1);
    Ok(())
}

#[tokio::test]
async fn test_empty_watch_list_cycle() -> anyhow::Result<()> {
    let harness = TestHarness::new().await?;
    let scheduler = PollScheduler::new(harness.runner.clone(), Vec::new(), Duration::from_secs(60));

    let report = scheduler.run_cycle().await;

    assert!(report.watches.is_empty());
    assert_eq!(report.failed_watches, 0);
    Ok(())
}
