//! Monitorability analysis: folds an STQL formula into `(history, horizon)`
//! frame counts and classifies past-time formulas.

pub mod bound;
pub mod requirements;

pub use bound::{Bound, Requirements, UNBOUNDED};
pub use requirements::{compute_requirements, compute_requirements_default_fps, is_past_time_formula};
