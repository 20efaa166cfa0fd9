//! Shared device context.
//!
//! One owned struct holds every controller intent, the dispatcher's mode
//! flags and the process-wide run flag.  It is wrapped in an [`Arc`] and
//! handed to each controller task at spawn time; every field is
//! individually atomic, so no lock is ever taken on the context itself.
//!
//! Intent semantics are last-write-wins with no queuing: the dispatcher
//! stores, the owning controller task observes the new value within one of
//! its poll periods.  The switch-event slot is the one exception: it is a
//! single-slot overwrite mailbox with read-and-clear consumption.

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU8, Ordering};

use crate::control::aux::AuxTarget;
use crate::control::curtain::CurtainTarget;
use crate::control::main_light::LightTarget;
use crate::drivers::button::SwitchEvent;
use crate::drivers::status_led::SignalState;

/// Intent pair for one auxiliary relay channel.
pub struct AuxIntent {
    state: AtomicU8,
    trigger: AtomicBool,
}

impl AuxIntent {
    fn new() -> Self {
        Self {
            state: AtomicU8::new(AuxTarget::Off as u8),
            trigger: AtomicBool::new(false),
        }
    }
}

/// All shared state of the engine.
pub struct DeviceContext {
    running: AtomicBool,
    selftest: AtomicBool,

    status: AtomicU8,
    curtain: AtomicU8,
    curtain_pos: AtomicI32,
    light: AtomicU8,
    aux: [AuxIntent; 3],
    storm_enabled: AtomicBool,
    storm_trigger: AtomicBool,

    switch_event: AtomicU8,

    automatic: AtomicBool,
    standby: AtomicBool,
    emergency: AtomicBool,
}

impl DeviceContext {
    /// Fresh context: everything stopped/idle, status `Init`, the given
    /// persisted curtain position.
    pub fn new(curtain_pos: i32) -> Self {
        Self {
            running: AtomicBool::new(true),
            selftest: AtomicBool::new(false),
            status: AtomicU8::new(SignalState::Init as u8),
            curtain: AtomicU8::new(CurtainTarget::Stop as u8),
            curtain_pos: AtomicI32::new(curtain_pos),
            light: AtomicU8::new(LightTarget::Idle as u8),
            aux: [AuxIntent::new(), AuxIntent::new(), AuxIntent::new()],
            storm_enabled: AtomicBool::new(false),
            storm_trigger: AtomicBool::new(false),
            switch_event: AtomicU8::new(0),
            automatic: AtomicBool::new(false),
            standby: AtomicBool::new(false),
            emergency: AtomicBool::new(false),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Request engine stop.  Every task loop observes this within one of
    /// its poll periods; in-flight pulses complete first.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    pub fn selftest_active(&self) -> bool {
        self.selftest.load(Ordering::Acquire)
    }

    pub fn set_selftest(&self, active: bool) {
        self.selftest.store(active, Ordering::Release);
    }

    // ── Status signal ─────────────────────────────────────────

    pub fn status(&self) -> SignalState {
        SignalState::from_u8(self.status.load(Ordering::Acquire))
    }

    pub fn set_status(&self, state: SignalState) {
        self.status.store(state as u8, Ordering::Release);
    }

    // ── Curtain ───────────────────────────────────────────────

    pub fn curtain_target(&self) -> CurtainTarget {
        CurtainTarget::from_u8(self.curtain.load(Ordering::Acquire))
    }

    pub fn set_curtain_target(&self, target: CurtainTarget) {
        self.curtain.store(target as u8, Ordering::Release);
    }

    /// Current curtain position (steps from fully open).
    pub fn curtain_position(&self) -> i32 {
        self.curtain_pos.load(Ordering::Acquire)
    }

    pub fn set_curtain_position(&self, pos: i32) {
        self.curtain_pos.store(pos, Ordering::Release);
    }

    // ── Main light ────────────────────────────────────────────

    pub fn light_target(&self) -> LightTarget {
        LightTarget::from_u8(self.light.load(Ordering::Acquire))
    }

    pub fn set_light_target(&self, target: LightTarget) {
        self.light.store(target as u8, Ordering::Release);
    }

    // ── Aux channels ──────────────────────────────────────────

    pub fn aux_target(&self, channel: usize) -> AuxTarget {
        AuxTarget::from_u8(self.aux[channel].state.load(Ordering::Acquire))
    }

    pub fn set_aux_target(&self, channel: usize, target: AuxTarget) {
        self.aux[channel].state.store(target as u8, Ordering::Release);
    }

    pub fn aux_trigger(&self, channel: usize) -> bool {
        self.aux[channel].trigger.load(Ordering::Acquire)
    }

    pub fn set_aux_trigger(&self, channel: usize) {
        self.aux[channel].trigger.store(true, Ordering::Release);
    }

    pub fn clear_aux_trigger(&self, channel: usize) {
        self.aux[channel].trigger.store(false, Ordering::Release);
    }

    // ── Thunderstorm ──────────────────────────────────────────

    pub fn storm_enabled(&self) -> bool {
        self.storm_enabled.load(Ordering::Acquire)
    }

    pub fn set_storm_enabled(&self, enabled: bool) {
        self.storm_enabled.store(enabled, Ordering::Release);
    }

    pub fn set_storm_trigger(&self) {
        self.storm_trigger.store(true, Ordering::Release);
    }

    /// Consume the one-shot storm trigger.
    pub fn take_storm_trigger(&self) -> bool {
        self.storm_trigger.swap(false, Ordering::AcqRel)
    }

    // ── Switch event slot ─────────────────────────────────────

    /// Publish a classified button event.  Overwrites any event the
    /// dispatcher has not consumed yet (single-slot mailbox).
    pub fn offer_switch_event(&self, event: SwitchEvent) {
        self.switch_event.store(event as u8, Ordering::Release);
    }

    /// Consume the pending button event, if any (read-and-clear).
    pub fn take_switch_event(&self) -> Option<SwitchEvent> {
        SwitchEvent::from_u8(self.switch_event.swap(0, Ordering::AcqRel))
    }

    // ── Mode flags ────────────────────────────────────────────

    pub fn automatic(&self) -> bool {
        self.automatic.load(Ordering::Acquire)
    }

    pub fn set_automatic(&self, on: bool) {
        self.automatic.store(on, Ordering::Release);
    }

    pub fn standby(&self) -> bool {
        self.standby.load(Ordering::Acquire)
    }

    pub fn set_standby(&self, on: bool) {
        self.standby.store(on, Ordering::Release);
    }

    pub fn emergency(&self) -> bool {
        self.emergency.load(Ordering::Acquire)
    }

    pub fn set_emergency(&self, on: bool) {
        self.emergency.store(on, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switch_event_is_read_and_clear() {
        let ctx = DeviceContext::new(0);
        assert_eq!(ctx.take_switch_event(), None);

        ctx.offer_switch_event(SwitchEvent::ShortPress);
        assert_eq!(ctx.take_switch_event(), Some(SwitchEvent::ShortPress));
        assert_eq!(ctx.take_switch_event(), None);
    }

    #[test]
    fn switch_event_overwrites_unconsumed() {
        let ctx = DeviceContext::new(0);
        ctx.offer_switch_event(SwitchEvent::ShortPress);
        ctx.offer_switch_event(SwitchEvent::LongPress);
        assert_eq!(ctx.take_switch_event(), Some(SwitchEvent::LongPress));
        assert_eq!(ctx.take_switch_event(), None);
    }

    #[test]
    fn storm_trigger_is_one_shot() {
        let ctx = DeviceContext::new(0);
        assert!(!ctx.take_storm_trigger());
        ctx.set_storm_trigger();
        assert!(ctx.take_storm_trigger());
        assert!(!ctx.take_storm_trigger());
    }

    #[test]
    fn intents_round_trip() {
        let ctx = DeviceContext::new(42);
        assert_eq!(ctx.curtain_position(), 42);
        assert_eq!(ctx.status(), SignalState::Init);

        ctx.set_curtain_target(CurtainTarget::Eclipse);
        assert_eq!(ctx.curtain_target(), CurtainTarget::Eclipse);

        ctx.set_light_target(LightTarget::On);
        assert_eq!(ctx.light_target(), LightTarget::On);

        ctx.set_aux_target(1, AuxTarget::On);
        assert_eq!(ctx.aux_target(1), AuxTarget::On);
        assert_eq!(ctx.aux_target(0), AuxTarget::Off);
    }
}
