//! Orchestration endpoint adapters.
//!
//! The real wire protocol to the orchestration system lives in an
//! external collaborator library; this crate only ships the null
//! endpoint, which connects to nothing and receives nothing.  It keeps
//! the engine runnable on a bench where only the button and the
//! self-test matter.

use std::thread;
use std::time::Duration;

use log::debug;

use crate::app::messages::{InboundMessage, OutboundMessage};
use crate::app::ports::{EndpointError, MessageEndpoint};

/// Endpoint that discards all sends and never yields a message.
pub struct NullEndpoint;

impl MessageEndpoint for NullEndpoint {
    fn connect(&mut self) -> Result<(), EndpointError> {
        Ok(())
    }

    fn send(&mut self, message: &OutboundMessage) -> Result<(), EndpointError> {
        debug!("null endpoint dropping {:?}", message);
        Ok(())
    }

    fn recv_timeout(
        &mut self,
        timeout: Duration,
    ) -> Result<Option<InboundMessage>, EndpointError> {
        thread::sleep(timeout);
        Ok(None)
    }
}
