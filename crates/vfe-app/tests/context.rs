//! VfeContext lifecycle tests.

use std::time::Duration;

use vfe_app::{AppError, DriverConfig, OverrideDef, OverrideKind, VfeContext, table_fingerprint};
use vfe_core::{FuseFieldIdentity, FuseValue, TableId, VarIdx, VarMask, VfeError};
use vfe_graph::{Override, VariableKind, VariableType};
use vfe_pmu::{PmuTransport, QueryError, TransportError, VarStatus, VfeSetPayload};
use vfe_table::{MemoryTables, TableLocator};
use vfe_table::encode::{EquEntry, FuseDesc, VarEntry, VfeTableEncoder};
use vfe_table::layout::{equ, var};

#[derive(Debug, Default)]
struct RecordingTransport {
    reject_construct: bool,
    constructs: usize,
    s_param: Option<FuseValue>,
}

impl PmuTransport for RecordingTransport {
    fn construct(
        &mut self,
        _payload: &VfeSetPayload,
        _timeout: Duration,
    ) -> Result<(), TransportError> {
        if self.reject_construct {
            return Err(TransportError::Rejected {
                command: "construct",
                status: 0x16,
            });
        }
        self.constructs += 1;
        Ok(())
    }

    fn query_var_status(
        &mut self,
        mask: &VarMask,
        timeout: Duration,
    ) -> Result<Vec<VarStatus>, TransportError> {
        let value = self.s_param.ok_or(TransportError::Timeout {
            timeout_ms: timeout.as_millis() as u64,
        })?;
        Ok(mask
            .iter()
            .map(|i| VarStatus {
                index: VarIdx::new(i).unwrap(),
                var_type: VariableType::SingleSensedFuse20,
                value,
                version: None,
            })
            .collect())
    }
}

/// voltage, frequency, their product, and the S-parameter fuse.
fn tables() -> MemoryTables {
    let mut enc = VfeTableEncoder::v40().polling_period_ms(20);
    enc.var(VarEntry::voltage())
        .var(VarEntry::frequency(1))
        .var(VarEntry::product(0, 1))
        .var(VarEntry::fuse(
            var::TYPE_SINGLE_SENSED_FUSE_20,
            FuseDesc {
                id: 0x07,
                id_version: 0x08,
                value_signed: true,
                ..FuseDesc::default()
            },
        ))
        .equ(EquEntry::new(equ::TYPE_QUADRATIC, Some(2), None));
    MemoryTables::new().with_table(TableId::Vfe, enc.finish())
}

#[test]
fn init_constructs_once_and_serves_queries() {
    let tables = tables();
    let transport = RecordingTransport {
        s_param: Some(FuseValue::Signed(-3)),
        ..RecordingTransport::default()
    };
    let mut ctx = VfeContext::init(&tables, DriverConfig::default(), transport).unwrap();

    assert_eq!(ctx.transport().constructs, 1);
    assert_eq!(ctx.graph().polling_period_ms(), 20);
    let expected = table_fingerprint(tables.locate_table(TableId::Vfe).unwrap());
    assert_eq!(ctx.fingerprint(), expected);
    assert_eq!(ctx.fingerprint().len(), 64);

    assert_eq!(ctx.get_s_param().unwrap(), FuseValue::Signed(-3));

    let (vars, equs) = ctx.invalidation_set(VarIdx::from(0));
    assert_eq!(vars.iter().collect::<Vec<_>>(), vec![0, 2]);
    assert_eq!(equs.iter().collect::<Vec<_>>(), vec![0]);
}

#[test]
fn overrides_come_from_config() {
    let config = DriverConfig {
        overrides: vec![OverrideDef {
            var: 1,
            kind: OverrideKind::Scale,
            value: 0.5,
        }],
        ..DriverConfig::default()
    };
    let ctx = VfeContext::init(&tables(), config, RecordingTransport::default()).unwrap();
    let VariableKind::SingleFrequency(f) = &ctx.graph().variable(VarIdx::from(1)).unwrap().kind
    else {
        panic!("expected frequency variable");
    };
    assert_eq!(f.value_override, Override::Scale(0.5));
}

#[test]
fn override_on_derived_variable_aborts_init() {
    let config = DriverConfig {
        overrides: vec![OverrideDef {
            var: 2,
            kind: OverrideKind::Value,
            value: 1.0,
        }],
        ..DriverConfig::default()
    };
    let err = VfeContext::init(&tables(), config, RecordingTransport::default()).unwrap_err();
    assert!(matches!(
        err,
        AppError::Construct(VfeError::InvalidOperandIndex {
            what: "override target",
            index: 2,
            ..
        })
    ));
}

#[test]
fn rejected_construct_aborts_init() {
    let transport = RecordingTransport {
        reject_construct: true,
        ..RecordingTransport::default()
    };
    let err = VfeContext::init(&tables(), DriverConfig::default(), transport).unwrap_err();
    assert!(matches!(
        err,
        AppError::Transport(TransportError::Rejected { status: 0x16, .. })
    ));
}

#[test]
fn query_errors_leave_context_usable() {
    let mut ctx =
        VfeContext::init(&tables(), DriverConfig::default(), RecordingTransport::default())
            .unwrap();
    let err = ctx.get_s_param().unwrap_err();
    assert!(matches!(
        err,
        AppError::Query(QueryError::Transport(TransportError::Timeout { timeout_ms: 1000 }))
    ));
    assert!(matches!(
        ctx.get_sensed_value(FuseFieldIdentity::S_PARAM_FIELD),
        Err(AppError::Query(QueryError::NotFound(_)))
    ));
    assert_eq!(ctx.graph().variables().len(), 4);
}

#[test]
fn missing_table_aborts_init() {
    let err = VfeContext::init(
        &MemoryTables::new(),
        DriverConfig::default(),
        RecordingTransport::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        AppError::Construct(VfeError::TableMissing {
            table: TableId::Vfe
        })
    ));
}
