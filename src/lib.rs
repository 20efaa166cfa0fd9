//! Environment unit control engine library.
//!
//! Exposes the pure-logic modules and the port traits for integration
//! testing. Raspberry Pi GPIO support is guarded by the `raspi` feature
//! inside `drivers::gpio`; everything else compiles and tests on any
//! host.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod context;
pub mod control;
pub mod drivers;
pub mod error;
pub mod pins;
