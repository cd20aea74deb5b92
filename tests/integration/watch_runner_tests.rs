use super::*;
use steal_finder::models::EntryIdentity;
use steal_finder::store::SeenStore;
use steal_finder::watch_runner::WatchStage;

#[tokio::test]
async fn test_qualifying_offer_is_notified_and_remembered() -> anyhow::Result<()> {
    let server = page_server("/bikes", 200, BIKES_PAGE).await;
    let harness = TestHarness::new().await?;
    let watch = bike_watch(&server, "/bikes");

    let report = harness.runner.run_watch(&watch).await;

    assert!(report.success);
    assert_eq!(report.entries_found, 2);
    assert_eq!(report.notifications_sent, 1);
    assert_eq!(report.rejected, 1);

    let sent = harness.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].title, "Trek Marlin 5");
    assert_eq!(sent[0].link, format!("{}/offer/1", server.uri()));
    assert_eq!(sent[0].field("Price"), Some("1 299,00 zł"));
    assert_eq!(sent[0].field("Max price"), Some("1500"));
    assert_eq!(sent[0].source, "Bikes");

    let identity = EntryIdentity::from(format!("{}/offer/1|1299", server.uri()));
    assert!(harness.store.is_seen(&identity).await?);

    let saved: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(harness.seen_path())?)?;
    let saved = saved.as_object().unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[identity.as_str()]["title"], "Trek Marlin 5");
    assert_eq!(saved[identity.as_str()]["price"], 1299.0);

    Ok(())
}

#[tokio::test]
async fn test_rerun_sends_nothing_new() -> anyhow::Result<()> {
    let server = page_server("/bikes", 200, BIKES_PAGE).await;
    let harness = TestHarness::new().await?;
    let watch = bike_watch(&server, "/bikes");

    harness.runner.run_watch(&watch).await;
    let second = harness.runner.run_watch(&watch).await;

    assert_eq!(second.notifications_sent, 0);
    assert_eq!(second.already_seen, 1);
    assert_eq!(harness.notifier.sent().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_seen_state_survives_restart() -> anyhow::Result<()> {
    let server = page_server("/bikes", 200, BIKES_PAGE).await;
    let watch = bike_watch(&server, "/bikes");

    let first = TestHarness::new().await?;
    first.runner.run_watch(&watch).await;
    assert_eq!(first.notifier.sent().len(), 1);

    let restarted = TestHarness::in_dir(first.dir).await?;
    let report = restarted.runner.run_watch(&watch).await;

    assert_eq!(report.notifications_sent, 0);
    assert!(restarted.notifier.sent().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_unreadable_price_is_dropped() -> anyhow::Result<()> {
    let server = page_server("/bikes", 200, ASK_FOR_PRICE_PAGE).await;
    let harness = TestHarness::new().await?;
    let mut watch = bike_watch(&server, "/bikes");
    watch.max_price = None;

    let report = harness.runner.run_watch(&watch).await;

    assert!(report.success);
    assert_eq!(report.entries_found, 1);
    assert_eq!(report.discarded, 1);
    assert!(harness.notifier.sent().is_empty());
    assert!(harness.store.is_empty().await);
    assert!(!harness.seen_path().exists());
    Ok(())
}

#[tokio::test]
async fn test_server_error_fails_watch() -> anyhow::Result<()> {
    let server = page_server("/bikes", 500, "oops").await;
    let harness = TestHarness::new().await?;

    let report = harness.runner.run_watch(&bike_watch(&server, "/bikes")).await;

    assert!(!report.success);
    assert_eq!(report.failed_at, Some(WatchStage::Fetching));
    assert!(harness.notifier.sent().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_failed_delivery_is_retried_next_run() -> anyhow::Result<()> {
    let server = page_server("/bikes", 200, BIKES_PAGE).await;
    let harness = TestHarness::new().await?;
    let watch = bike_watch(&server, "/bikes");

    harness.notifier.set_failing(true);
    let first = harness.runner.run_watch(&watch).await;
    assert_eq!(first.notification_failures, 1);
    assert!(harness.store.is_empty().await);

    harness.notifier.set_failing(false);
    let second = harness.runner.run_watch(&watch).await;
    assert_eq!(second.notifications_sent, 1);
    assert_eq!(harness.notifier.sent().len(), 1);
    assert_eq!(harness.store.len().await, 1);
    Ok(())
}

#[tokio::test]
async fn test_price_drop_is_announced_again() -> anyhow::Result<()> {
    let before = BIKES_PAGE.replace(r#"href="/offer/1""#, r#"href="https://bikes.example/offer/1""#);
    let after = before.replace("1 299,00 zł", "1 199,00 zł");
    let first_server = page_server("/bikes", 200, &before).await;
    let second_server = page_server("/bikes", 200, &after).await;
    let harness = TestHarness::new().await?;

    harness.runner.run_watch(&bike_watch(&first_server, "/bikes")).await;
    let report = harness.runner.run_watch(&bike_watch(&second_server, "/bikes")).await;

    assert_eq!(report.notifications_sent, 1);
    let sent = harness.notifier.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1].field("Price"), Some("1 199,00 zł"));
    assert_eq!(harness.store.len().await, 2);
    Ok(())
}
