//! `compute_requirements`: a single post-order fold computing `(history,
//! horizon)` in frames for every sub-formula.

use stql_ast::expr::{CompareOp, Expr, ExprNode, FreezeBindings, OrderedF64};
use stql_ast::fold::{fold, Fold};
use stql_ast::AstError;
use tracing::trace;

use crate::bound::{Bound, Requirements};

/// Which side of a `TimeDiff`/`FrameDiff` the distinguished "now" constant
/// sits on, if either. Used to decide whether a bound built on this diff
/// constrains history or horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DiffShape {
    /// `rhs` is `C_TIME`/`C_FRAME`: the diff shrinks as a future tick `lhs`
    /// approaches "now", so a bound on it constrains the horizon.
    NowOnRight,
    /// `lhs` is `C_TIME`/`C_FRAME`: the diff grows as "now" moves away from
    /// a captured past tick `rhs`, so a bound on it constrains history.
    NowOnLeft,
    /// Both sides are "now": the diff is always zero.
    BothNow,
    /// Neither side is "now": no distinguished temporal anchor, so a bound
    /// built on this diff is conservatively unbounded in both directions.
    NeitherNow,
}

fn classify(lhs: &Expr, rhs: &Expr) -> DiffShape {
    let lhs_now = matches!(&**lhs, ExprNode::CTime | ExprNode::CFrame);
    let rhs_now = matches!(&**rhs, ExprNode::CTime | ExprNode::CFrame);
    match (lhs_now, rhs_now) {
        (true, true) => DiffShape::BothNow,
        (true, false) => DiffShape::NowOnLeft,
        (false, true) => DiffShape::NowOnRight,
        (false, false) => DiffShape::NeitherNow,
    }
}

/// Fold output: the requirements contributed by this sub-tree, plus (only
/// meaningful directly under a `TimeDiff`/`FrameDiff` node) the diff shape
/// its parent bound needs to classify which requirement it feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Value {
    req: Requirements,
    diff_shape: Option<DiffShape>,
}

impl Value {
    fn leaf() -> Self {
        Value {
            req: Requirements::ZERO,
            diff_shape: None,
        }
    }

    fn passthrough(req: Requirements) -> Self {
        Value {
            req,
            diff_shape: None,
        }
    }
}

struct RequirementsFold {
    fps: f64,
}

fn seconds_to_frame_count(seconds: f64, fps: f64) -> u64 {
    if seconds <= 0.0 {
        0
    } else {
        (seconds * fps).ceil() as u64
    }
}

impl Fold for RequirementsFold {
    type Out = Value;

    fn const_bool(&self, _b: bool) -> Self::Out {
        Value::leaf()
    }
    fn time_var(&self, _name: &str) -> Self::Out {
        Value::leaf()
    }
    fn frame_var(&self, _name: &str) -> Self::Out {
        Value::leaf()
    }
    fn object_var(&self, _name: &str) -> Self::Out {
        Value::leaf()
    }
    fn c_time(&self) -> Self::Out {
        Value::leaf()
    }
    fn c_frame(&self) -> Self::Out {
        Value::leaf()
    }

    fn time_diff(&self, lhs_raw: &Expr, rhs_raw: &Expr, _lhs: Self::Out, _rhs: Self::Out) -> Self::Out {
        Value {
            req: Requirements::ZERO,
            diff_shape: Some(classify(lhs_raw, rhs_raw)),
        }
    }
    fn frame_diff(&self, lhs_raw: &Expr, rhs_raw: &Expr, _lhs: Self::Out, _rhs: Self::Out) -> Self::Out {
        Value {
            req: Requirements::ZERO,
            diff_shape: Some(classify(lhs_raw, rhs_raw)),
        }
    }

    fn time_bound(&self, diff: Self::Out, _op: CompareOp, value: OrderedF64) -> Self::Out {
        let frames = seconds_to_frame_count(value.0, self.fps);
        Value::passthrough(bound_contribution(diff.diff_shape, frames))
    }
    fn frame_bound(&self, diff: Self::Out, _op: CompareOp, value: i64) -> Self::Out {
        let frames = value.max(0) as u64;
        Value::passthrough(bound_contribution(diff.diff_shape, frames))
    }

    fn not(&self, inner: Self::Out) -> Self::Out {
        Value::passthrough(inner.req)
    }
    fn and(&self, operands: Vec<Self::Out>) -> Self::Out {
        Value::passthrough(reduce_max(operands))
    }
    fn or(&self, operands: Vec<Self::Out>) -> Self::Out {
        Value::passthrough(reduce_max(operands))
    }

    fn exists(&self, _vars: &[Expr], body: Self::Out) -> Self::Out {
        Value::passthrough(body.req)
    }
    fn forall(&self, _vars: &[Expr], body: Self::Out) -> Self::Out {
        Value::passthrough(body.req)
    }

    fn next(&self, inner: Self::Out, steps: u32) -> Self::Out {
        Value::passthrough(Requirements {
            history: inner.req.history,
            horizon: inner.req.horizon.saturating_add_u64(steps as u64),
        })
    }
    fn previous(&self, inner: Self::Out, steps: u32) -> Self::Out {
        Value::passthrough(Requirements {
            history: inner.req.history.saturating_add_u64(steps as u64),
            horizon: inner.req.horizon,
        })
    }
    fn always(&self, inner: Self::Out) -> Self::Out {
        trace!(target: "analyze", op = "Always", "horizon saturates to Unbounded");
        Value::passthrough(Requirements {
            history: inner.req.history,
            horizon: Bound::Unbounded,
        })
    }
    fn eventually(&self, inner: Self::Out) -> Self::Out {
        trace!(target: "analyze", op = "Eventually", "horizon saturates to Unbounded");
        Value::passthrough(Requirements {
            history: inner.req.history,
            horizon: Bound::Unbounded,
        })
    }
    fn until(&self, lhs: Self::Out, rhs: Self::Out) -> Self::Out {
        trace!(target: "analyze", op = "Until", "horizon saturates to Unbounded");
        Value::passthrough(Requirements {
            history: lhs.req.history.max(rhs.req.history),
            horizon: Bound::Unbounded,
        })
    }
    fn since(&self, lhs: Self::Out, rhs: Self::Out) -> Self::Out {
        trace!(target: "analyze", op = "Since", "history saturates to Unbounded");
        Value::passthrough(Requirements {
            history: Bound::Unbounded,
            horizon: lhs.req.horizon.max(rhs.req.horizon),
        })
    }

    fn freeze(&self, _bindings: &FreezeBindings, body: Self::Out) -> Self::Out {
        Value::passthrough(body.req)
    }

    fn is_class(&self, _objvar: Self::Out, _class_id: i64) -> Self::Out {
        Value::leaf()
    }
    fn high_confidence(&self, _objvar: Self::Out, _threshold: OrderedF64) -> Self::Out {
        Value::leaf()
    }
    fn low_confidence(&self, _objvar: Self::Out, _threshold: OrderedF64) -> Self::Out {
        Value::leaf()
    }

    fn empty_set(&self) -> Self::Out {
        Value::leaf()
    }
    fn universe(&self) -> Self::Out {
        Value::leaf()
    }
    fn bbox(&self, _objvar: Self::Out) -> Self::Out {
        Value::leaf()
    }
    fn spatial_complement(&self, inner: Self::Out) -> Self::Out {
        Value::passthrough(inner.req)
    }
    fn spatial_union(&self, operands: Vec<Self::Out>) -> Self::Out {
        Value::passthrough(reduce_max(operands))
    }
    fn spatial_intersect(&self, operands: Vec<Self::Out>) -> Self::Out {
        Value::passthrough(reduce_max(operands))
    }
    fn spatial_exists(&self, inner: Self::Out) -> Self::Out {
        Value::passthrough(inner.req)
    }
    fn spatial_forall(&self, inner: Self::Out) -> Self::Out {
        Value::passthrough(inner.req)
    }
}

fn reduce_max(operands: Vec<Value>) -> Requirements {
    operands
        .into_iter()
        .map(|v| v.req)
        .fold(Requirements::ZERO, Requirements::max)
}

fn bound_contribution(shape: Option<DiffShape>, frames: u64) -> Requirements {
    match shape {
        Some(DiffShape::NowOnRight) => Requirements {
            history: Bound::Finite(0),
            horizon: Bound::finite(frames),
        },
        Some(DiffShape::NowOnLeft) => Requirements {
            history: Bound::finite(frames),
            horizon: Bound::Finite(0),
        },
        Some(DiffShape::BothNow) => Requirements::ZERO,
        Some(DiffShape::NeitherNow) | None => Requirements {
            history: Bound::Unbounded,
            horizon: Bound::Unbounded,
        },
    }
}

/// Compute `(history, horizon)` for `expr` at the given frame rate.
pub fn compute_requirements(expr: &Expr, fps: f64) -> Result<Requirements, AstError> {
    let folder = RequirementsFold { fps };
    Ok(fold(&folder, expr).req)
}

/// [`compute_requirements`] at a default frame rate of 1.0 fps.
pub fn compute_requirements_default_fps(expr: &Expr) -> Result<Requirements, AstError> {
    compute_requirements(expr, 1.0)
}

/// True iff `expr`'s horizon is exactly zero: verdicts for it are final
/// the tick they are computed, with no future lookahead.
pub fn is_past_time_formula(expr: &Expr) -> Result<bool, AstError> {
    Ok(compute_requirements_default_fps(expr)?.horizon == Bound::Finite(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use stql_ast::expr::factory::*;
    use stql_ast::sugar;

    #[test]
    fn constants_and_atoms_require_nothing() {
        let f = sugar::is_class("car", 1).unwrap();
        let req = compute_requirements(&f, 30.0).unwrap();
        assert_eq!(req.history, Bound::Finite(0));
        assert_eq!(req.horizon, Bound::Finite(0));
    }

    #[test]
    fn previous_adds_to_history_only() {
        let inner = sugar::is_class("car", 1).unwrap();
        let f = previous(inner, 3).unwrap();
        let req = compute_requirements(&f, 30.0).unwrap();
        assert_eq!(req.history, Bound::Finite(3));
        assert_eq!(req.horizon, Bound::Finite(0));
    }

    #[test]
    fn next_adds_to_horizon_only() {
        let inner = sugar::is_class("car", 1).unwrap();
        let f = next(inner, 1).unwrap();
        let req = compute_requirements(&f, 30.0).unwrap();
        assert_eq!(req.history, Bound::Finite(0));
        assert_eq!(req.horizon, Bound::Finite(1));
    }

    #[test]
    fn always_and_eventually_are_unbounded_horizon() {
        let inner = sugar::is_class("car", 1).unwrap();
        let f1 = always(inner.clone()).unwrap();
        let f2 = eventually(inner).unwrap();
        assert_eq!(compute_requirements(&f1, 30.0).unwrap().horizon, Bound::Unbounded);
        assert_eq!(compute_requirements(&f2, 30.0).unwrap().horizon, Bound::Unbounded);
    }

    #[test]
    fn since_is_unbounded_history_bounded_horizon() {
        let a = sugar::is_class("car", 1).unwrap();
        let b = sugar::high_confidence("car", 0.5).unwrap();
        let f = since(a, b).unwrap();
        let req = compute_requirements(&f, 30.0).unwrap();
        assert_eq!(req.history, Bound::Unbounded);
        assert_eq!(req.horizon, Bound::Finite(0));
    }

    #[test]
    fn until_is_bounded_history_unbounded_horizon() {
        let a = sugar::is_class("car", 1).unwrap();
        let b = sugar::high_confidence("car", 0.5).unwrap();
        let f = until(a, b).unwrap();
        let req = compute_requirements(&f, 30.0).unwrap();
        assert_eq!(req.history, Bound::Finite(0));
        assert_eq!(req.horizon, Bound::Unbounded);
    }

    #[test]
    fn time_bound_converts_seconds_to_frames_on_horizon_side() {
        let diff = time_diff(time_var("t0"), c_time()).unwrap();
        let b = time_bound(diff, CompareOp::Lt, 2.0).unwrap();
        let req = compute_requirements(&b, 30.0).unwrap();
        assert_eq!(req.horizon, Bound::Finite(60));
        assert_eq!(req.history, Bound::Finite(0));
    }

    #[test]
    fn time_bound_on_history_side() {
        let diff = time_diff(c_time(), time_var("t0")).unwrap();
        let b = time_bound(diff, CompareOp::Lt, 1.0).unwrap();
        let req = compute_requirements(&b, 10.0).unwrap();
        assert_eq!(req.history, Bound::Finite(10));
        assert_eq!(req.horizon, Bound::Finite(0));
    }

    #[test]
    fn diff_without_now_constant_is_unbounded_both_ways() {
        let diff = time_diff(time_var("t0"), time_var("t1")).unwrap();
        let b = time_bound(diff, CompareOp::Lt, 1.0).unwrap();
        let req = compute_requirements(&b, 30.0).unwrap();
        assert_eq!(req.history, Bound::Unbounded);
        assert_eq!(req.horizon, Bound::Unbounded);
    }

    #[test]
    fn default_fps_is_one() {
        let diff = time_diff(time_var("t0"), c_time()).unwrap();
        let b = time_bound(diff, CompareOp::Lt, 2.0).unwrap();
        let req = compute_requirements_default_fps(&b).unwrap();
        assert_eq!(req.horizon, Bound::Finite(2));
    }

    #[test]
    fn is_past_time_formula_matches_zero_horizon() {
        let f = sugar::is_class("car", 1).unwrap();
        assert!(is_past_time_formula(&f).unwrap());

        let g = eventually(sugar::is_class("car", 1).unwrap()).unwrap();
        assert!(!is_past_time_formula(&g).unwrap());
    }

    #[test]
    fn and_or_take_componentwise_max() {
        let a = previous(sugar::is_class("car", 1).unwrap(), 2).unwrap();
        let b = next(sugar::is_class("car", 1).unwrap(), 5).unwrap();
        let conj = and(vec![a, b]).unwrap();
        let req = compute_requirements(&conj, 30.0).unwrap();
        assert_eq!(req.history, Bound::Finite(2));
        assert_eq!(req.horizon, Bound::Finite(5));
    }
}
