//! Shared fixtures.

use arm_common::prelude::{WireMessage, encode_command};
use arm_relay::control::ControlStrategy;
use arm_relay::dispatch::RelayApp;
use arm_relay::events::RecordingEvents;
use arm_relay::pose::PoseTable;
use arm_relay::transport::RecordingTransport;

pub type TestApp = RelayApp<RecordingTransport, RecordingEvents>;

pub fn app() -> TestApp {
    app_with(ControlStrategy::Passthrough)
}

pub fn app_with(strategy: ControlStrategy) -> TestApp {
    RelayApp::new(
        PoseTable::builtin(),
        strategy,
        RecordingTransport::new(),
        RecordingEvents::new(),
    )
}

pub fn frame<M: WireMessage>(msg: &M) -> Vec<u8> {
    encode_command(msg, 0)
}
