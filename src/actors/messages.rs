//! Message types for actor communication

use tokio::sync::oneshot;

use crate::ProbeResult;

/// Commands that can be sent to a ProbeActor
#[derive(Debug)]
pub enum ProbeCommand {
    /// Run one probe outside the schedule
    ///
    /// The result is recorded like any scheduled probe. The schedule restarts
    /// from it: the next probe follows after a full interval of sleep.
    ProbeNow {
        /// Channel to send the result back
        respond_to: oneshot::Sender<ProbeResult>,
    },

    /// Stop the loop
    ///
    /// Only handled while sleeping, so an in-flight probe always completes.
    Shutdown,
}
