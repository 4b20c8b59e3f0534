//! Runtime read path for sensed-fuse values.

use std::time::Duration;

use tracing::{debug, warn};
use vfe_core::{FuseFieldIdentity, FuseSelection, FuseValue, VarMask};
use vfe_graph::{Variable, VfeGraph};

use crate::error::QueryError;
use crate::payload::VarStatus;
use crate::transport::PmuTransport;

/// Borrowed view that answers sensed-value queries over a built graph.
///
/// Holds the graph mutably because each successful read refreshes the
/// variable's cached fuse value.
#[derive(Debug)]
pub struct VfeQuery<'a, T: PmuTransport + ?Sized> {
    graph: &'a mut VfeGraph,
    transport: &'a mut T,
    timeout: Duration,
}

impl<'a, T: PmuTransport + ?Sized> VfeQuery<'a, T> {
    pub fn new(graph: &'a mut VfeGraph, transport: &'a mut T, timeout: Duration) -> Self {
        Self {
            graph,
            transport,
            timeout,
        }
    }

    /// Live `(signedness, raw value)` of the sensed fuse built for `identity`.
    pub fn get_sensed_value(&mut self, identity: FuseFieldIdentity) -> Result<FuseValue, QueryError> {
        Ok(self.fetch(identity)?.value)
    }

    /// The S-parameter, looked up by stable fuse id first and by field id
    /// for tables that describe it through the field tables.
    pub fn get_s_param(&mut self) -> Result<FuseValue, QueryError> {
        match self.get_sensed_value(FuseFieldIdentity::S_PARAM) {
            Err(QueryError::NotFound(_)) => {
                self.get_sensed_value(FuseFieldIdentity::S_PARAM_FIELD)
            }
            other => other,
        }
    }

    /// Live reading run through the variable's version policy and
    /// hardware correction.
    pub fn get_resolved_value(
        &mut self,
        identity: FuseFieldIdentity,
    ) -> Result<FuseSelection, QueryError> {
        let status = self.fetch(identity)?;
        let var = self.lookup(identity)?;
        let sensing = var
            .kind
            .fuse_sensing()
            .ok_or(QueryError::NotFound(identity))?;
        Ok(sensing.resolve(status.value, status.version))
    }

    fn lookup(&self, identity: FuseFieldIdentity) -> Result<&Variable, QueryError> {
        self.graph
            .find_sensed_fuse(identity)
            .ok_or(QueryError::NotFound(identity))
    }

    fn fetch(&mut self, identity: FuseFieldIdentity) -> Result<VarStatus, QueryError> {
        let var = self.lookup(identity)?;
        let (idx, expected) = (var.index, var.var_type());

        let statuses = self
            .transport
            .query_var_status(&VarMask::with_var(idx), self.timeout)?;
        let status = statuses
            .into_iter()
            .find(|s| s.index == idx)
            .ok_or(QueryError::MissingStatus { index: idx.index() })?;

        if status.var_type != expected {
            warn!(
                var = idx.index(),
                expected = ?expected,
                actual = ?status.var_type,
                "coprocessor status type mismatch"
            );
            return Err(QueryError::TypeMismatch {
                index: idx.index(),
                expected,
                actual: status.var_type,
            });
        }

        self.graph.refresh_fuse_cache(idx, status.value);
        debug!(var = idx.index(), value = %status.value, "read sensed fuse");
        Ok(status)
    }
}
