//! Query façade tests against an in-memory transport.

use std::time::Duration;

use vfe_core::{
    FuseFieldIdentity, FuseId, FuseSelection, FuseValue, HwCorrection, OutputRange, VarIdx,
    VarMask, VersionCheckPolicy,
};
use vfe_graph::{
    FuseSensing, Override, SensedFuse20, SingleVoltage, Variable, VariableKind, VariableType,
    VfeGraph, VfeGraphBuilder,
};
use vfe_pmu::{
    PmuTransport, QueryError, TransportError, VarStatus, VfeQuery, VfeSetPayload,
};

/// Answers status queries from a canned record list.
#[derive(Debug, Default)]
struct MockTransport {
    records: Vec<VarStatus>,
    fail: Option<TransportError>,
    constructed: Option<VfeSetPayload>,
    queried: Vec<VarMask>,
}

impl PmuTransport for MockTransport {
    fn construct(
        &mut self,
        payload: &VfeSetPayload,
        _timeout: Duration,
    ) -> Result<(), TransportError> {
        self.constructed = Some(payload.clone());
        Ok(())
    }

    fn query_var_status(
        &mut self,
        mask: &VarMask,
        _timeout: Duration,
    ) -> Result<Vec<VarStatus>, TransportError> {
        self.queried.push(*mask);
        if let Some(err) = &self.fail {
            return Err(err.clone());
        }
        Ok(self
            .records
            .iter()
            .filter(|r| mask.contains(r.index.index()))
            .copied()
            .collect())
    }
}

const TIMEOUT: Duration = Duration::from_millis(50);

fn s_param_graph(policy: VersionCheckPolicy, correction: HwCorrection) -> VfeGraph {
    let mut builder = VfeGraphBuilder::new(2, 0).unwrap();
    builder
        .add_variable(Variable::new(
            VarIdx::from(0),
            OutputRange::default(),
            VariableKind::SingleVoltage(SingleVoltage::default()),
        ))
        .unwrap();
    builder
        .add_variable(Variable::new(
            VarIdx::from(1),
            OutputRange::default(),
            VariableKind::SingleSensedFuse20(SensedFuse20 {
                local_id: 0x07,
                local_id_version: 0x08,
                fuse_id: Some(FuseId::SParameter),
                fuse_id_version: Some(FuseId::SParameterVersion),
                sensing: FuseSensing {
                    policy,
                    default_value: FuseValue::Signed(-5),
                    hw_correction: correction,
                    value_is_signed: true,
                    cached: None,
                },
                value_override: Override::None,
            }),
        ))
        .unwrap();
    builder.build().unwrap()
}

fn fuse_record(value: FuseValue, version: u32) -> VarStatus {
    VarStatus {
        index: VarIdx::from(1),
        var_type: VariableType::SingleSensedFuse20,
        value,
        version: Some(version),
    }
}

#[test]
fn sensed_value_round_trip_refreshes_cache() {
    let mut graph = s_param_graph(VersionCheckPolicy::default(), HwCorrection::IDENTITY);
    let mut transport = MockTransport {
        records: vec![fuse_record(FuseValue::Signed(-42), 0)],
        ..MockTransport::default()
    };

    let value = VfeQuery::new(&mut graph, &mut transport, TIMEOUT)
        .get_s_param()
        .unwrap();
    assert_eq!(value, FuseValue::Signed(-42));
    assert_eq!(
        transport.queried,
        vec![VarMask::with_var(VarIdx::from(1))]
    );

    let cached = graph
        .variable(VarIdx::from(1))
        .and_then(|v| v.kind.fuse_sensing())
        .and_then(|s| s.cached);
    assert_eq!(cached, Some(FuseValue::Signed(-42)));
}

#[test]
fn type_tag_mismatch() {
    let mut graph = s_param_graph(VersionCheckPolicy::default(), HwCorrection::IDENTITY);
    let mut transport = MockTransport {
        records: vec![VarStatus {
            var_type: VariableType::SingleVoltage,
            ..fuse_record(FuseValue::Signed(1), 0)
        }],
        ..MockTransport::default()
    };
    let err = VfeQuery::new(&mut graph, &mut transport, TIMEOUT)
        .get_sensed_value(FuseFieldIdentity::S_PARAM)
        .unwrap_err();
    assert_eq!(
        err,
        QueryError::TypeMismatch {
            index: 1,
            expected: VariableType::SingleSensedFuse20,
            actual: VariableType::SingleVoltage,
        }
    );
    // A failed read leaves the cache alone.
    let sensing = graph.variable(VarIdx::from(1)).unwrap().kind.fuse_sensing().copied();
    assert_eq!(sensing.and_then(|s| s.cached), None);
}

#[test]
fn unknown_identity_never_reaches_the_transport() {
    let mut graph = s_param_graph(VersionCheckPolicy::default(), HwCorrection::IDENTITY);
    let mut transport = MockTransport::default();
    let identity = FuseFieldIdentity::Fuse(FuseId::Iddq);
    let err = VfeQuery::new(&mut graph, &mut transport, TIMEOUT)
        .get_sensed_value(identity)
        .unwrap_err();
    assert_eq!(err, QueryError::NotFound(identity));
    assert!(transport.queried.is_empty());
}

#[test]
fn transport_errors_propagate() {
    let mut graph = s_param_graph(VersionCheckPolicy::default(), HwCorrection::IDENTITY);
    let mut transport = MockTransport {
        fail: Some(TransportError::Timeout { timeout_ms: 50 }),
        ..MockTransport::default()
    };
    let err = VfeQuery::new(&mut graph, &mut transport, TIMEOUT)
        .get_s_param()
        .unwrap_err();
    assert_eq!(
        err,
        QueryError::Transport(TransportError::Timeout { timeout_ms: 50 })
    );
    assert_eq!(transport.queried.len(), 1);
}

#[test]
fn missing_status_record() {
    let mut graph = s_param_graph(VersionCheckPolicy::default(), HwCorrection::IDENTITY);
    let mut transport = MockTransport::default();
    assert_eq!(
        VfeQuery::new(&mut graph, &mut transport, TIMEOUT)
            .get_s_param()
            .unwrap_err(),
        QueryError::MissingStatus { index: 1 }
    );
}

fn checked(ignore: bool, use_default: bool) -> VersionCheckPolicy {
    VersionCheckPolicy {
        expected: 3,
        expected_is_bitmask: false,
        check_enabled: true,
        ignore_check_failure: ignore,
        use_default_on_check_failure: use_default,
    }
}

#[test]
fn resolved_value_applies_correction_on_match() {
    let correction = HwCorrection {
        scale: 2,
        offset: -10,
    };
    let mut graph = s_param_graph(checked(false, false), correction);
    let mut transport = MockTransport {
        records: vec![fuse_record(FuseValue::Signed(7), 3)],
        ..MockTransport::default()
    };
    let sel = VfeQuery::new(&mut graph, &mut transport, TIMEOUT)
        .get_resolved_value(FuseFieldIdentity::S_PARAM)
        .unwrap();
    assert_eq!(sel, FuseSelection::Corrected(FuseValue::Signed(4)));
}

#[test]
fn resolved_value_on_version_mismatch() {
    let correction = HwCorrection {
        scale: 2,
        offset: -10,
    };
    let record = fuse_record(FuseValue::Signed(7), 4);

    let mut graph = s_param_graph(checked(false, true), correction);
    let mut transport = MockTransport {
        records: vec![record],
        ..MockTransport::default()
    };
    let sel = VfeQuery::new(&mut graph, &mut transport, TIMEOUT)
        .get_resolved_value(FuseFieldIdentity::S_PARAM)
        .unwrap();
    assert_eq!(sel, FuseSelection::Default(FuseValue::Signed(-5)));

    let mut graph = s_param_graph(checked(true, false), correction);
    let sel = VfeQuery::new(&mut graph, &mut transport, TIMEOUT)
        .get_resolved_value(FuseFieldIdentity::S_PARAM)
        .unwrap();
    assert_eq!(sel, FuseSelection::Uncorrected(FuseValue::Signed(7)));

    // Without ignore, a mismatch falls back to the default even when the
    // policy does not ask for it.
    let mut graph = s_param_graph(checked(false, false), correction);
    let sel = VfeQuery::new(&mut graph, &mut transport, TIMEOUT)
        .get_resolved_value(FuseFieldIdentity::S_PARAM)
        .unwrap();
    assert_eq!(sel, FuseSelection::Default(FuseValue::Signed(-5)));
}

#[test]
fn resolved_value_without_version_reading_uses_correction() {
    let policy = VersionCheckPolicy {
        expected: 0b0110,
        expected_is_bitmask: true,
        check_enabled: true,
        ignore_check_failure: false,
        use_default_on_check_failure: true,
    };
    let correction = HwCorrection {
        scale: 2,
        offset: -10,
    };
    let mut graph = s_param_graph(policy, correction);
    let mut transport = MockTransport {
        records: vec![VarStatus {
            version: None,
            ..fuse_record(FuseValue::Signed(7), 0)
        }],
        ..MockTransport::default()
    };
    let sel = VfeQuery::new(&mut graph, &mut transport, TIMEOUT)
        .get_resolved_value(FuseFieldIdentity::S_PARAM)
        .unwrap();
    assert_eq!(sel, FuseSelection::Corrected(FuseValue::Signed(4)));

    // A bitmask policy still rejects a live version outside the mask.
    transport.records = vec![fuse_record(FuseValue::Signed(7), 3)];
    let sel = VfeQuery::new(&mut graph, &mut transport, TIMEOUT)
        .get_resolved_value(FuseFieldIdentity::S_PARAM)
        .unwrap();
    assert_eq!(sel, FuseSelection::Default(FuseValue::Signed(-5)));

    transport.records = vec![fuse_record(FuseValue::Signed(7), 2)];
    let sel = VfeQuery::new(&mut graph, &mut transport, TIMEOUT)
        .get_resolved_value(FuseFieldIdentity::S_PARAM)
        .unwrap();
    assert_eq!(sel, FuseSelection::Corrected(FuseValue::Signed(4)));
}

#[test]
fn construct_payload_carries_masks() {
    let graph = s_param_graph(VersionCheckPolicy::default(), HwCorrection::IDENTITY);
    let payload = VfeSetPayload::from_graph(&graph);
    assert_eq!(payload.variable_mask.iter().collect::<Vec<_>>(), vec![0, 1]);
    assert!(payload.equation_mask.is_empty());
    assert_eq!(payload.variables.len(), 2);

    let json: serde_json::Value = serde_json::from_str(&payload.to_json().unwrap()).unwrap();
    assert_eq!(json["variables"].as_array().map(Vec::len), Some(2));
    assert_eq!(json["polling_period_ms"], 0);

    let mut transport = MockTransport::default();
    transport.construct(&payload, TIMEOUT).unwrap();
    assert_eq!(transport.constructed, Some(payload));
}
