//! Attribute-grammar style fold over [`ExprNode`] trees.
//!
//! A [`Fold`] implementation supplies one method per variant, each
//! receiving its children already folded into `Self::Out`. The free
//! [`fold`] function is the post-order driver: it's the only place that
//! knows how to recurse, so every consumer (requirements analysis, the
//! pretty-printer) writes pure per-variant logic and nothing else.
//!
//! `stql-monitor`'s evaluator does not implement this trait: it must
//! revisit the same sub-formula at several distinct ticks and under
//! several distinct object-variable bindings, which a single bottom-up
//! fold cannot express. See `DESIGN.md`.

use crate::expr::{CompareOp, Expr, ExprNode, FreezeBindings, OrderedF64};

/// One output value per node, computed from already-folded children.
pub trait Fold {
    type Out: Clone;

    fn const_bool(&self, b: bool) -> Self::Out;
    fn time_var(&self, name: &str) -> Self::Out;
    fn frame_var(&self, name: &str) -> Self::Out;
    fn object_var(&self, name: &str) -> Self::Out;
    fn c_time(&self) -> Self::Out;
    fn c_frame(&self) -> Self::Out;

    /// `lhs_raw`/`rhs_raw` are the un-folded operand nodes, made available
    /// alongside the folded `lhs`/`rhs` values so an implementation can
    /// classify the diff's shape (e.g. which side is the distinguished
    /// "now" constant) without a second traversal.
    fn time_diff(&self, lhs_raw: &Expr, rhs_raw: &Expr, lhs: Self::Out, rhs: Self::Out) -> Self::Out;
    fn frame_diff(&self, lhs_raw: &Expr, rhs_raw: &Expr, lhs: Self::Out, rhs: Self::Out) -> Self::Out;

    fn time_bound(&self, diff: Self::Out, op: CompareOp, value: OrderedF64) -> Self::Out;
    fn frame_bound(&self, diff: Self::Out, op: CompareOp, value: i64) -> Self::Out;

    fn not(&self, inner: Self::Out) -> Self::Out;
    fn and(&self, operands: Vec<Self::Out>) -> Self::Out;
    fn or(&self, operands: Vec<Self::Out>) -> Self::Out;

    fn exists(&self, vars: &[Expr], body: Self::Out) -> Self::Out;
    fn forall(&self, vars: &[Expr], body: Self::Out) -> Self::Out;

    fn next(&self, inner: Self::Out, steps: u32) -> Self::Out;
    fn previous(&self, inner: Self::Out, steps: u32) -> Self::Out;
    fn always(&self, inner: Self::Out) -> Self::Out;
    fn eventually(&self, inner: Self::Out) -> Self::Out;
    fn until(&self, lhs: Self::Out, rhs: Self::Out) -> Self::Out;
    fn since(&self, lhs: Self::Out, rhs: Self::Out) -> Self::Out;

    fn freeze(&self, bindings: &FreezeBindings, body: Self::Out) -> Self::Out;

    fn is_class(&self, objvar: Self::Out, class_id: i64) -> Self::Out;
    fn high_confidence(&self, objvar: Self::Out, threshold: OrderedF64) -> Self::Out;
    fn low_confidence(&self, objvar: Self::Out, threshold: OrderedF64) -> Self::Out;

    fn empty_set(&self) -> Self::Out;
    fn universe(&self) -> Self::Out;
    fn bbox(&self, objvar: Self::Out) -> Self::Out;
    fn spatial_complement(&self, inner: Self::Out) -> Self::Out;
    fn spatial_union(&self, operands: Vec<Self::Out>) -> Self::Out;
    fn spatial_intersect(&self, operands: Vec<Self::Out>) -> Self::Out;
    fn spatial_exists(&self, inner: Self::Out) -> Self::Out;
    fn spatial_forall(&self, inner: Self::Out) -> Self::Out;
}

/// Post-order driver: fold every child before folding the parent.
pub fn fold<F: Fold>(f: &F, e: &Expr) -> F::Out {
    match &**e {
        ExprNode::ConstBool(b) => f.const_bool(*b),
        ExprNode::TimeVar(name) => f.time_var(name),
        ExprNode::FrameVar(name) => f.frame_var(name),
        ExprNode::ObjectVar(name) => f.object_var(name),
        ExprNode::CTime => f.c_time(),
        ExprNode::CFrame => f.c_frame(),

        ExprNode::TimeDiff(lhs, rhs) => f.time_diff(lhs, rhs, fold(f, lhs), fold(f, rhs)),
        ExprNode::FrameDiff(lhs, rhs) => f.frame_diff(lhs, rhs, fold(f, lhs), fold(f, rhs)),

        ExprNode::TimeBound(diff, op, value) => f.time_bound(fold(f, diff), *op, *value),
        ExprNode::FrameBound(diff, op, value) => f.frame_bound(fold(f, diff), *op, *value),

        ExprNode::Not(inner) => f.not(fold(f, inner)),
        ExprNode::And(operands) => f.and(operands.iter().map(|o| fold(f, o)).collect()),
        ExprNode::Or(operands) => f.or(operands.iter().map(|o| fold(f, o)).collect()),

        ExprNode::Exists(vars, body) => f.exists(vars, fold(f, body)),
        ExprNode::Forall(vars, body) => f.forall(vars, fold(f, body)),

        ExprNode::Next(inner, steps) => f.next(fold(f, inner), *steps),
        ExprNode::Previous(inner, steps) => f.previous(fold(f, inner), *steps),
        ExprNode::Always(inner) => f.always(fold(f, inner)),
        ExprNode::Eventually(inner) => f.eventually(fold(f, inner)),
        ExprNode::Until(lhs, rhs) => f.until(fold(f, lhs), fold(f, rhs)),
        ExprNode::Since(lhs, rhs) => f.since(fold(f, lhs), fold(f, rhs)),

        ExprNode::Freeze(bindings, body) => f.freeze(bindings, fold(f, body)),

        ExprNode::IsClass(objvar, class_id) => f.is_class(fold(f, objvar), *class_id),
        ExprNode::HighConfidence(objvar, threshold) => {
            f.high_confidence(fold(f, objvar), *threshold)
        }
        ExprNode::LowConfidence(objvar, threshold) => {
            f.low_confidence(fold(f, objvar), *threshold)
        }

        ExprNode::EmptySet => f.empty_set(),
        ExprNode::Universe => f.universe(),
        ExprNode::BBoxExpr(objvar) => f.bbox(fold(f, objvar)),
        ExprNode::SpatialComplement(inner) => f.spatial_complement(fold(f, inner)),
        ExprNode::SpatialUnion(operands) => {
            f.spatial_union(operands.iter().map(|o| fold(f, o)).collect())
        }
        ExprNode::SpatialIntersect(operands) => {
            f.spatial_intersect(operands.iter().map(|o| fold(f, o)).collect())
        }
        ExprNode::SpatialExists(inner) => f.spatial_exists(fold(f, inner)),
        ExprNode::SpatialForall(inner) => f.spatial_forall(fold(f, inner)),
    }
}
