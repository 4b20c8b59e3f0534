//! vfe-pmu: coprocessor messages, transport trait and the query façade.

pub mod error;
pub mod payload;
pub mod query;
pub mod transport;

pub use error::{QueryError, TransportError};
pub use payload::{VarStatus, VfeSetPayload};
pub use query::VfeQuery;
pub use transport::PmuTransport;
