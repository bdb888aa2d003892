pub mod slack;

use anyhow::Result;

use crate::decide::NotificationEvent;

pub use slack::SlackNotifier;

/// Outbound transport for decided events. Delivery failure is the transport's
/// problem to report; the decision ledger is never rolled back for it.
#[async_trait::async_trait]
pub trait Notifier {
    async fn send(&self, event: &NotificationEvent) -> Result<()>;
}
