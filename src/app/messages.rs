//! Typed messages exchanged with the orchestration system.
//!
//! The wire framing lives in the endpoint adapter; these enums are the
//! boundary types the dispatcher works with.  Serde derives give the
//! adapter a JSON form for free and keep the variants self-describing in
//! logs.

use serde::{Deserialize, Serialize};

/// Layout-wide hardware state announced by the orchestration system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HardwareState {
    Error,
    Standby,
    EmergencyStop,
    Manual,
    Automatic,
}

/// Tri-state field of a [`InboundMessage::SetAmbience`] command: each
/// aspect may be commanded or left as it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToggleState {
    On,
    Off,
    Unset,
}

/// Four-valued switch field of a [`InboundMessage::SetEnvironment`]
/// command.  `Auto` hands control to the layout clock; this unit has no
/// clock input, so it reads as `On`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwitchCommand {
    On,
    Off,
    /// Fire the channel's one-shot behaviour once.
    Trigger,
    Auto,
}

/// Commands the engine consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InboundMessage {
    HardwareStateChanged(HardwareState),
    /// Power the unit down (terminal).
    ClientShutdown,
    /// Reboot the unit (terminal).
    ClientReset,
    /// Run the actuator self-test walk.
    ClientSelfTest,
    /// Direct ambience control; rejected while automatic.
    SetAmbience {
        curtain_up: ToggleState,
        main_light_on: ToggleState,
    },
    /// Effect channel control: thunderstorm and the three aux relays.
    SetEnvironment {
        thunder_storm: SwitchCommand,
        aux1: SwitchCommand,
        aux2: SwitchCommand,
        aux3: SwitchCommand,
    },
    /// Legacy manual curtain jog: toggles a run in the given direction;
    /// rejected while automatic.
    CurtainToggle {
        up: bool,
    },
    /// Layout-wide clock tick, reserved.
    GlobalTimerTick,
}

/// Commands the engine produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutboundMessage {
    /// Ask for the current hardware state after (re)connecting.
    GetHardwareState,
    /// Short button press.
    ToggleStandbyMode,
    /// Long button press: request layout-wide shutdown.
    HardwareShutdown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inbound_json_round_trip() {
        let msg = InboundMessage::SetAmbience {
            curtain_up: ToggleState::On,
            main_light_on: ToggleState::Unset,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(serde_json::from_str::<InboundMessage>(&json).unwrap(), msg);
    }

    #[test]
    fn environment_json_round_trip() {
        let msg = InboundMessage::SetEnvironment {
            thunder_storm: SwitchCommand::Trigger,
            aux1: SwitchCommand::On,
            aux2: SwitchCommand::Off,
            aux3: SwitchCommand::Auto,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(serde_json::from_str::<InboundMessage>(&json).unwrap(), msg);
    }

    #[test]
    fn hardware_state_tags_are_stable() {
        let json = serde_json::to_string(&InboundMessage::HardwareStateChanged(
            HardwareState::EmergencyStop,
        ))
        .unwrap();
        assert!(json.contains("EmergencyStop"), "{json}");
    }
}
