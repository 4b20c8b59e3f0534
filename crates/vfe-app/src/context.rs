//! VFE context: decode, build and hand off the graph, then serve queries.

use sha2::{Digest, Sha256};
use tracing::{error, info};
use vfe_core::{EquMask, FuseFieldIdentity, FuseSelection, FuseValue, TableId, VarIdx, VarMask};
use vfe_graph::{VfeGraph, VfeGraphBuilder};
use vfe_pmu::{PmuTransport, VfeQuery, VfeSetPayload};
use vfe_table::{DecodeOptions, TableLocator, VfeHeader, decode_tables};

use crate::config::DriverConfig;
use crate::error::AppResult;

/// SHA-256 of a table image, hex encoded.
pub fn table_fingerprint(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Decode tables, apply configured overrides and run the dependency passes.
pub fn build_graph<L: TableLocator + ?Sized>(
    locator: &L,
    config: &DriverConfig,
) -> AppResult<(VfeHeader, VfeGraph)> {
    let options = DecodeOptions {
        strict_fuse_ids: config.strict_fuse_ids,
    };
    let decoded = decode_tables(locator, &options)?;
    let mut builder = decoded.builder;
    apply_overrides(&mut builder, config)?;
    Ok((decoded.header, builder.build()?))
}

fn apply_overrides(builder: &mut VfeGraphBuilder, config: &DriverConfig) -> AppResult<()> {
    for def in &config.overrides {
        builder.set_override(VarIdx::from(def.var), def.to_override())?;
    }
    Ok(())
}

/// Everything VFE owns for the lifetime of one GPU instance.
#[derive(Debug)]
pub struct VfeContext<T: PmuTransport> {
    header: VfeHeader,
    graph: VfeGraph,
    transport: T,
    config: DriverConfig,
    fingerprint: String,
}

impl<T: PmuTransport> VfeContext<T> {
    /// Build the graph and construct it on the coprocessor.
    ///
    /// Nothing is kept when any step fails.
    pub fn init<L: TableLocator + ?Sized>(
        locator: &L,
        config: DriverConfig,
        mut transport: T,
    ) -> AppResult<Self> {
        let (header, graph) = build_graph(locator, &config).inspect_err(|e| {
            error!(error = %e, "VFE construction failed");
        })?;
        let fingerprint = locator
            .locate_table(TableId::Vfe)
            .map(table_fingerprint)
            .unwrap_or_default();

        let payload = VfeSetPayload::from_graph(&graph);
        transport
            .construct(&payload, config.pmu_timeout())
            .inspect_err(|e| error!(error = %e, "coprocessor rejected VFE construct"))?;

        info!(
            fingerprint = %fingerprint,
            variables = graph.variables().len(),
            equations = graph.equations().len(),
            "VFE context ready"
        );
        Ok(Self {
            header,
            graph,
            transport,
            config,
            fingerprint,
        })
    }

    pub fn header(&self) -> &VfeHeader {
        &self.header
    }

    pub fn graph(&self) -> &VfeGraph {
        &self.graph
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// SHA-256 of the VFE table the context was built from.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn query(&mut self) -> VfeQuery<'_, T> {
        let timeout = self.config.pmu_timeout();
        VfeQuery::new(&mut self.graph, &mut self.transport, timeout)
    }

    pub fn get_sensed_value(&mut self, identity: FuseFieldIdentity) -> AppResult<FuseValue> {
        Ok(self.query().get_sensed_value(identity)?)
    }

    pub fn get_s_param(&mut self) -> AppResult<FuseValue> {
        Ok(self.query().get_s_param()?)
    }

    pub fn get_resolved_value(&mut self, identity: FuseFieldIdentity) -> AppResult<FuseSelection> {
        Ok(self.query().get_resolved_value(identity)?)
    }

    /// Variables and equations to recompute after `changed` moves.
    pub fn invalidation_set(&self, changed: VarIdx) -> (VarMask, EquMask) {
        self.graph.invalidation_set(changed)
    }
}
