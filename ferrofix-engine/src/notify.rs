/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 3/2/26
******************************************************************************/

//! Lifecycle notifier implementations.

use ferrofix_core::types::SessionIdentity;
use ferrofix_session::proxy::EventNotifier;
use ferrofix_session::state::DisconnectReason;
use tracing::info;

/// Notifier that reports lifecycle events to the tracing subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNotifier;

impl EventNotifier for LoggingNotifier {
    fn on_session_active(&self, identity: &SessionIdentity) {
        info!(%identity, "session active");
    }

    fn on_session_disconnected(&self, identity: &SessionIdentity, reason: DisconnectReason) {
        info!(%identity, %reason, "session disconnected");
    }
}
