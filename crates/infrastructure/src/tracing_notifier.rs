use evaldesk_application::{Notice, NoticeSeverity, Notifier};
use tracing::{info, warn};

/// Notifier that surfaces transient notices as tracing events.
///
/// Stands in for the console's toast surface in headless runs and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.severity {
            NoticeSeverity::Success => {
                info!(title = notice.title, detail = notice.detail, "notice");
            }
            NoticeSeverity::Failure => {
                warn!(title = notice.title, detail = notice.detail, "notice");
            }
        }
    }
}
