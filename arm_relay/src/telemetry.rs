//! Housekeeping telemetry reporter.
//!
//! Packages the counters and the telemetry-facing joint state into a
//! [`HousekeepingTlm`] and hands it to the transport, which stamps the send
//! time. Every invocation advances the command counter: it counts housekeeping
//! reports sent, not ground commands. The report carries the counter value from
//! before the increment.

use arm_common::msg::HousekeepingTlm;

use crate::store::SharedState;
use crate::transport::{Outbound, Transport};

/// Build and send one housekeeping report. Never fails.
pub fn report_housekeeping<T: Transport>(
    state: &mut SharedState,
    transport: &mut T,
) -> HousekeepingTlm {
    let counters = state.counters();
    let telemetry = state.telemetry();
    let tlm = HousekeepingTlm {
        error_counter: counters.error,
        command_counter: counters.command,
        joints: telemetry.joints,
        is_moving: telemetry.is_moving,
    };

    state.bump_command_counter();
    transport.transmit(Outbound::Housekeeping(tlm));
    tlm
}
