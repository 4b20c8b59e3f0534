//! Table decoding entry point.
//!
//! Decoding is all-or-nothing: groups are only handed back once every entry
//! parsed and every cross reference checked.

use tracing::{debug, info};
use vfe_core::{TableId, VfeError, VfeResult};
use vfe_graph::VfeGraphBuilder;

use crate::field::FieldTables;
use crate::header::VfeHeader;
use crate::layout::var;
use crate::locator::TableLocator;
use crate::reader::ByteReader;
use crate::var_entry::{self, RawVarEntry, VarDecodeCtx};
use crate::{equ_entry, param_entry};

/// Knobs for decoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Fail on fuse-20 ids missing from the fuse-id lookup instead of
    /// leaving the variable unmapped.
    pub strict_fuse_ids: bool,
}

/// Output of a successful decode.
#[derive(Debug)]
pub struct DecodedTables {
    pub header: VfeHeader,
    /// Populated and validated; dependency masks are not built yet.
    pub builder: VfeGraphBuilder,
}

fn require_table<L: TableLocator + ?Sized>(locator: &L, table: TableId) -> VfeResult<&[u8]> {
    locator
        .locate_table(table)
        .ok_or(VfeError::TableMissing { table })
}

/// Decode the VFE table (and the field tables when a register-described
/// fuse needs them) into a validated graph builder.
pub fn decode_tables<L: TableLocator + ?Sized>(
    locator: &L,
    options: &DecodeOptions,
) -> VfeResult<DecodedTables> {
    let data = require_table(locator, TableId::Vfe)?;
    let r = ByteReader::new(TableId::Vfe, data);
    let header = VfeHeader::parse(&r)?;
    debug!(
        version = header.version.code(),
        variables = header.var_entry_count,
        equations = header.equ_entry_count,
        parameters = header.param_entry_count,
        len = r.len(),
        "parsed VFE header"
    );

    let raw_vars = (0..header.var_entry_count)
        .map(|i| RawVarEntry::read(&r, &header, i))
        .collect::<VfeResult<Vec<_>>>()?;

    let fields = if raw_vars
        .iter()
        .any(|v| v.type_code == var::TYPE_SINGLE_SENSED_FUSE)
    {
        Some(FieldTables::parse(
            require_table(locator, TableId::Field)?,
            require_table(locator, TableId::FieldRegister)?,
        )?)
    } else {
        None
    };

    let params = param_entry::decode_all(&r, &header)?;

    let mut builder = VfeGraphBuilder::new(header.var_entry_count, header.equ_entry_count)?;
    builder.set_polling_period_ms(header.polling_period_ms);

    let ctx = VarDecodeCtx {
        fields: fields.as_ref(),
        strict_fuse_ids: options.strict_fuse_ids,
    };
    let mut var_count = 0;
    for (i, raw) in raw_vars.iter().enumerate() {
        if let Some(v) = var_entry::decode(raw, i, &ctx)? {
            builder.add_variable(v)?;
            var_count += 1;
        }
    }

    let mut equ_count = 0;
    for i in 0..header.equ_entry_count {
        if let Some(e) = equ_entry::decode(&r, &header, i, &params)? {
            builder.add_equation(e)?;
            equ_count += 1;
        }
    }

    builder.validate()?;

    info!(
        version = header.version.code(),
        variables = var_count,
        equations = equ_count,
        polling_period_ms = header.polling_period_ms,
        "decoded VFE tables"
    );
    Ok(DecodedTables { header, builder })
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::locator::MemoryTables;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn arbitrary_entries_never_panic(
            v40 in any::<bool>(),
            vars in 0_u8..6,
            equs in 0_u8..6,
            body in prop::collection::vec(any::<u8>(), 0..400),
        ) {
            let mut data = if v40 {
                vec![0x40, 0x0C, 0x19, vars, 0x1A, equs, 0, 0, 0x05, 4, 0, 0]
            } else {
                vec![0x10, 0x07, 0x19, vars, 0x18, equs, 0]
            };
            data.extend_from_slice(&body);
            let tables = MemoryTables::new().with_table(TableId::Vfe, data);
            if let Ok(decoded) = decode_tables(&tables, &DecodeOptions::default()) {
                let _ = decoded.builder.build();
            }
        }
    }
}
