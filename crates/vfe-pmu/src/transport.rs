//! Coprocessor transport seam.

use std::fmt::Debug;
use std::time::Duration;

use vfe_core::VarMask;

use crate::error::TransportError;
use crate::payload::{VarStatus, VfeSetPayload};

/// Synchronous request/response channel to the coprocessor.
///
/// Both calls may block until the coprocessor answers or `timeout` passes.
/// Implementations report failures and never retry on their own.
pub trait PmuTransport: Debug {
    /// Hand the constructed graph to the coprocessor.
    ///
    /// # Errors
    ///
    /// Returns error if the message cannot be delivered or is rejected.
    fn construct(
        &mut self,
        payload: &VfeSetPayload,
        timeout: Duration,
    ) -> Result<(), TransportError>;

    /// Live status for every variable in `mask`, one record per index.
    ///
    /// # Errors
    ///
    /// Returns error on timeout or a failed exchange.
    fn query_var_status(
        &mut self,
        mask: &VarMask,
        timeout: Duration,
    ) -> Result<Vec<VarStatus>, TransportError>;
}
