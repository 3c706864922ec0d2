use thiserror::Error;

/// Errors raised while constructing or evaluating an STQL formula.
///
/// `MalformedFormula` is raised by the factories in [`crate::expr`] when a
/// node would be structurally inconsistent (wrong child type, empty
/// operand list, non-positive step count, ...). `UnboundVariable` is only
/// ever raised by an evaluator (e.g. `stql-monitor`) walking a formula at
/// runtime; it lives here because it is conceptually part of the AST's
/// contract (an evaluator must reject a free variable, not guess).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AstError {
    #[error("malformed formula: {reason}")]
    MalformedFormula { reason: String },

    #[error("unbound variable: {name}")]
    UnboundVariable { name: String },
}

impl AstError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedFormula {
            reason: reason.into(),
        }
    }

    pub fn unbound(name: impl Into<String>) -> Self {
        Self::UnboundVariable { name: name.into() }
    }
}
