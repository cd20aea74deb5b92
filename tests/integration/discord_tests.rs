use super::*;
use chrono::{TimeZone, Utc};
use serde_json::json;
use steal_finder::plugins::notifiers::DiscordNotifier;
use steal_finder::plugins::traits::NotificationField;
use wiremock::matchers::{body_partial_json, header};

fn bike_message() -> NotificationMessage {
    NotificationMessage {
        title: "Trek Marlin 5".to_string(),
        link: "https://bikes.example/offer/1".to_string(),
        fields: vec![
            NotificationField {
                name: "Price".to_string(),
                value: "1 299,00 zł".to_string(),
                inline: true,
            },
            NotificationField {
                name: "Max price".to_string(),
                value: "1500".to_string(),
                inline: true,
            },
        ],
        source: "Bikes".to_string(),
        timestamp: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
    }
}

#[tokio::test]
async fn test_connection_check_succeeds_for_known_channel() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/channels/{}", CHANNEL_ID)))
        .and(header("Authorization", format!("Bot {}", BOT_TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": CHANNEL_ID})))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = DiscordNotifier::new(discord_config(&server))?;
    notifier.test_connection().await?;
    Ok(())
}

#[tokio::test]
async fn test_connection_check_fails_for_unknown_channel() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Unknown Channel"})))
        .mount(&server)
        .await;

    let notifier = DiscordNotifier::new(discord_config(&server))?;
    let err = notifier.test_connection().await.unwrap_err();

    assert!(matches!(err, AppError::Notifier { .. }));
    assert!(err.to_string().contains("404"));
    Ok(())
}

#[tokio::test]
async fn test_notify_posts_embed() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/channels/{}/messages", CHANNEL_ID)))
        .and(header("Authorization", format!("Bot {}", BOT_TOKEN).as_str()))
        .and(body_partial_json(json!({
            "embeds": [{
                "title": "Trek Marlin 5",
                "url": "https://bikes.example/offer/1",
                "footer": { "text": "Bikes" },
                "timestamp": "2026-03-01T12:00:00+00:00"
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "1"})))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = DiscordNotifier::new(discord_config(&server))?;
    notifier.notify(&bike_message()).await?;
    Ok(())
}

#[tokio::test]
async fn test_notify_rejected_is_error() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"message": "Missing Access"})))
        .mount(&server)
        .await;

    let notifier = DiscordNotifier::new(discord_config(&server))?;
    let err = notifier.notify(&bike_message()).await.unwrap_err();

    assert!(err.to_string().contains("403"));
    Ok(())
}
