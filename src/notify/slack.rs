use anyhow::{Context, Result};
use reqwest::Client;

use super::Notifier;
use crate::decide::NotificationEvent;

pub struct SlackNotifier {
    webhook_url: Option<String>,
    client: Client,
}

impl SlackNotifier {
    /// `None` disables delivery; events are still decided and logged.
    pub fn new(webhook_url: Option<String>) -> Self {
        Self {
            webhook_url,
            client: Client::new(),
        }
    }
}

/// Message shown in the channel, with a map link so the spawn is one tap away.
pub fn format_message(ev: &NotificationEvent) -> String {
    let s = &ev.spawn;
    let minutes = ev.time_remaining.num_seconds() as f64 / 60.0;
    format!(
        "*{}* (rarity {}) spotted {:.2} miles away, expires in {:.1} min\n<https://maps.google.com/maps?q={},{}|map>",
        s.species_name, s.rarity, ev.distance_miles, minutes, s.position.latitude, s.position.longitude
    )
}

#[async_trait::async_trait]
impl Notifier for SlackNotifier {
    async fn send(&self, ev: &NotificationEvent) -> Result<()> {
        let Some(url) = &self.webhook_url else {
            tracing::debug!("Slack disabled (no webhook configured)");
            return Ok(());
        };

        let body = serde_json::json!({ "text": format_message(ev) });

        self.client
            .post(url)
            .json(&body)
            .send()
            .await
            .context("slack post")?
            .error_for_status()
            .context("slack non-2xx")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinate;
    use crate::spawn::Spawn;
    use chrono::{Duration, TimeZone, Utc};

    fn event() -> NotificationEvent {
        NotificationEvent {
            spawn: Spawn {
                identity: "149:sp9:e1".into(),
                species_id: 149,
                species_name: "Dragonite".into(),
                rarity: 9,
                position: Coordinate::new(40.7128, -74.0060),
                disappear_time: Utc.with_ymd_and_hms(2026, 8, 1, 12, 8, 0).unwrap(),
            },
            distance_miles: 1.25,
            time_remaining: Duration::seconds(480),
        }
    }

    #[test]
    fn message_includes_species_distance_and_map_link() {
        let msg = format_message(&event());
        assert!(msg.contains("Dragonite"));
        assert!(msg.contains("rarity 9"));
        assert!(msg.contains("1.25 miles"));
        assert!(msg.contains("8.0 min"));
        assert!(msg.contains("maps.google.com/maps?q=40.7128,-74.006"));
    }

    #[tokio::test]
    async fn unconfigured_webhook_disables_delivery() {
        // Built from a config with no webhook set; send is a quiet no-op.
        let notifier = SlackNotifier::new(None);
        assert!(notifier.send(&event()).await.is_ok());
    }
}
