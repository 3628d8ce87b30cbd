//! Results of background work, fed back into the control loop.

use clawdeck_client::{GatewayError, RawTranscript};
use clawdeck_types::ui::MessageTarget;
use clawdeck_types::{ArchivedRun, Health, ModelOption, Process, Session, SpawnResult};

/// One completed asynchronous call.
///
/// Results carry no request identity; whichever handler matches the variant
/// applies it, even if the user has moved on since the call started.
#[derive(Debug)]
pub enum AppEvent {
    Sessions(Result<Vec<Session>, GatewayError>),
    Processes(Result<Vec<Process>, GatewayError>),
    Archived(Result<Vec<ArchivedRun>, GatewayError>),
    Transcript(Result<RawTranscript, GatewayError>),
    ProcessLog(Result<String, GatewayError>),
    Health(Result<Health, GatewayError>),
    Models(Result<Vec<ModelOption>, GatewayError>),
    MessageSent {
        target: MessageTarget,
        result: Result<String, GatewayError>,
    },
    Spawned(Result<SpawnResult, GatewayError>),
    Killed {
        name: String,
        result: Result<(), GatewayError>,
    },
}
