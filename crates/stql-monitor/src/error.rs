use stql_ast::AstError;
use thiserror::Error;

/// Errors raised by [`crate::OnlineMonitor`] construction or evaluation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MonitorError {
    #[error("formula is not monitorable: horizon is {horizon}")]
    NotMonitorable { horizon: String },

    #[error("out-of-order frame: got frame_num {got}, last was {last}")]
    OutOfOrderFrame { got: u64, last: u64 },

    #[error(transparent)]
    Ast(#[from] AstError),
}
