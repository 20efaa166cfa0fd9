//! Curtain motor controller.
//!
//! The curtain rides a worm drive with no limit switches, so the engine
//! dead-reckons: position is a counter in drive units, 0 = fully open,
//! 120 = fully closed, advanced 4 units per one-second motor tick. The
//! eclipse command aims past fully closed (130) to soak up drift; every
//! run is capped at 30 ticks so a bad counter can never keep the motor
//! energized indefinitely.
//!
//! The task re-reads the intent every tick, so a new command cancels a
//! run at the next tick boundary. Both motor pins are de-energized on
//! completion, cancellation and engine shutdown.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::info;

use crate::context::DeviceContext;
use crate::drivers::pin_register::PinRegister;
use crate::pins::LogicalPin;

/// Fully-closed position in drive units.
pub const MAX_POS: i32 = 120;
/// Eclipse aim point, past fully closed to absorb counter drift.
pub const ECLIPSE_POS: i32 = 130;
/// Drive units covered per one-second motor tick.
pub const STEP_PER_TICK: i32 = 4;
/// Hard ceiling on a single motor run.
pub const MAX_RUN_TICKS: u32 = 30;

/// Commanded curtain movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CurtainTarget {
    Stop = 0,
    /// Drive to position 0.
    Open = 1,
    /// Drive down past fully closed.
    Eclipse = 2,
    /// Legacy manual run towards open.
    ManualUp = 3,
    /// Legacy manual run towards closed.
    ManualDown = 4,
}

impl CurtainTarget {
    pub fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Open,
            2 => Self::Eclipse,
            3 => Self::ManualUp,
            4 => Self::ManualDown,
            _ => Self::Stop,
        }
    }
}

/// Physical motor direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards open (direction pin high).
    Up,
    /// Towards closed (direction pin low).
    Down,
}

/// Direction the motor must run for `target` from `position`, or `None`
/// when there is nothing to do.
pub fn direction_for(target: CurtainTarget, position: i32) -> Option<Direction> {
    match target {
        CurtainTarget::Stop => None,
        CurtainTarget::Open => (position > 0).then_some(Direction::Up),
        CurtainTarget::Eclipse => (position < ECLIPSE_POS).then_some(Direction::Down),
        CurtainTarget::ManualUp => Some(Direction::Up),
        CurtainTarget::ManualDown => Some(Direction::Down),
    }
}

/// Position after one motor tick in `dir`, clamped to the mechanical
/// range. The stored counter never exceeds `MAX_POS` even while the
/// eclipse run aims at `ECLIPSE_POS`.
pub fn advance(position: i32, dir: Direction) -> i32 {
    let next = match dir {
        Direction::Up => position - STEP_PER_TICK,
        Direction::Down => position + STEP_PER_TICK,
    };
    next.clamp(0, MAX_POS)
}

/// Motor ticks a run for `target` needs from `position`, ceiling
/// applied. The eclipse run is planned against the 130 aim point, not
/// the clamped counter, so a curtain already reading fully closed still
/// gets the overdrive ticks that soak up dead-reckoning drift.
pub fn planned_ticks(target: CurtainTarget, position: i32) -> u32 {
    let distance = match target {
        CurtainTarget::Stop => 0,
        CurtainTarget::Open => position,
        CurtainTarget::Eclipse => ECLIPSE_POS - position,
        // Manual runs only end on Stop or the tick ceiling.
        CurtainTarget::ManualUp | CurtainTarget::ManualDown => return MAX_RUN_TICKS,
    };
    let ticks = (distance.max(0) as u32).div_ceil(STEP_PER_TICK as u32);
    ticks.min(MAX_RUN_TICKS)
}

/// Legacy toggle: stopped starts a manual run, running stops it.
/// Rejected while the engine is in automatic mode (the eclipse owns the
/// curtain then).
pub fn toggle(current: CurtainTarget, dir: Direction, automatic: bool) -> Option<CurtainTarget> {
    if automatic {
        return None;
    }
    if current == CurtainTarget::Stop {
        Some(match dir {
            Direction::Up => CurtainTarget::ManualUp,
            Direction::Down => CurtainTarget::ManualDown,
        })
    } else {
        Some(CurtainTarget::Stop)
    }
}

/// Curtain task body.
pub fn run(ctx: Arc<DeviceContext>, register: Arc<PinRegister>, tick: Duration) {
    info!("curtain task up, position {}", ctx.curtain_position());

    while ctx.is_running() {
        if ctx.selftest_active() {
            thread::sleep(Duration::from_millis(500));
            continue;
        }

        let target = ctx.curtain_target();
        let planned = planned_ticks(target, ctx.curtain_position());
        let Some(dir) = direction_for(target, ctx.curtain_position()) else {
            thread::sleep(tick);
            continue;
        };

        info!(
            "curtain run: {:?} from {} over {} ticks",
            target,
            ctx.curtain_position(),
            planned
        );
        register.set(LogicalPin::CurtainDir, dir == Direction::Up);
        register.set_high(LogicalPin::CurtainOn);

        for _ in 0..planned {
            if !ctx.is_running() {
                break;
            }
            thread::sleep(tick);
            let pos = advance(ctx.curtain_position(), dir);
            ctx.set_curtain_position(pos);

            if ctx.curtain_target() != target {
                info!("curtain run cancelled at {}", pos);
                break;
            }
        }

        register.set_low(LogicalPin::CurtainOn);
        register.set_low(LogicalPin::CurtainDir);
        if ctx.curtain_target() == target {
            ctx.set_curtain_target(CurtainTarget::Stop);
        }
    }

    register.set_low(LogicalPin::CurtainOn);
    register.set_low(LogicalPin::CurtainDir);
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Drive the pure core the way the task loop does, without sleeping.
    /// Returns the final position and how many ticks the motor ran.
    fn simulate(mut position: i32, target: CurtainTarget) -> (i32, u32) {
        let planned = planned_ticks(target, position);
        if let Some(dir) = direction_for(target, position) {
            for _ in 0..planned {
                position = advance(position, dir);
            }
            (position, planned)
        } else {
            (position, 0)
        }
    }

    #[test]
    fn open_reaches_zero() {
        assert_eq!(simulate(120, CurtainTarget::Open), (0, 30));
        assert_eq!(simulate(3, CurtainTarget::Open), (0, 1));
    }

    #[test]
    fn eclipse_reaches_closed_within_ceiling() {
        assert_eq!(simulate(0, CurtainTarget::Eclipse), (MAX_POS, MAX_RUN_TICKS));
    }

    #[test]
    fn eclipse_overdrives_a_closed_curtain() {
        // Counter already at fully closed: the motor still runs the
        // ticks towards the 130 aim point to absorb drift.
        assert_eq!(planned_ticks(CurtainTarget::Eclipse, MAX_POS), 3);
        let (pos, ticks) = simulate(MAX_POS, CurtainTarget::Eclipse);
        assert_eq!(pos, MAX_POS);
        assert!(ticks > 0, "overdrive ticks must run");
    }

    #[test]
    fn open_when_open_is_a_no_op() {
        assert_eq!(direction_for(CurtainTarget::Open, 0), None);
        assert_eq!(planned_ticks(CurtainTarget::Open, 0), 0);
    }

    #[test]
    fn manual_run_is_bounded_by_ceiling() {
        // From the middle, a manual run caps at the floor or ceiling.
        assert_eq!(simulate(60, CurtainTarget::ManualDown).0, MAX_POS);
        assert_eq!(simulate(60, CurtainTarget::ManualUp).0, 0);
        assert_eq!(planned_ticks(CurtainTarget::ManualUp, 60), MAX_RUN_TICKS);
    }

    #[test]
    fn toggle_starts_and_stops() {
        assert_eq!(
            toggle(CurtainTarget::Stop, Direction::Up, false),
            Some(CurtainTarget::ManualUp)
        );
        assert_eq!(
            toggle(CurtainTarget::ManualUp, Direction::Up, false),
            Some(CurtainTarget::Stop)
        );
    }

    #[test]
    fn toggle_rejected_in_automatic() {
        assert_eq!(toggle(CurtainTarget::Stop, Direction::Down, true), None);
        assert_eq!(toggle(CurtainTarget::ManualDown, Direction::Down, true), None);
    }

    proptest! {
        /// The counter stays inside the mechanical range through any
        /// command sequence, including runs cut short by the ceiling.
        #[test]
        fn position_stays_in_range(
            start in 0i32..=MAX_POS,
            commands in proptest::collection::vec(0u8..=4, 1..20),
        ) {
            let mut pos = start;
            for raw in commands {
                pos = simulate(pos, CurtainTarget::from_u8(raw)).0;
                prop_assert!((0..=MAX_POS).contains(&pos), "position {pos} escaped");
            }
        }

        /// A single tick never moves the counter outside the range.
        #[test]
        fn advance_clamps(pos in 0i32..=MAX_POS) {
            prop_assert!((0..=MAX_POS).contains(&advance(pos, Direction::Up)));
            prop_assert!((0..=MAX_POS).contains(&advance(pos, Direction::Down)));
        }
    }
}
