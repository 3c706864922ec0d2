//! The recursive STQL evaluator.
//!
//! Deliberately *not* a [`stql_ast::Fold`] implementation: the same
//! sub-formula must be visited at several distinct ticks (`Next`,
//! `Previous`, `Until`, `Since`) and, for quantifiers, under several
//! distinct object-variable bindings — a single bottom-up attribute fold
//! cannot express that access pattern. This module shares only the
//! per-variant `match` discipline with `stql-ast`'s fold.

mod env;

pub use env::Env;

use stql_ast::expr::{CompareOp, Expr, ExprNode};
use stql_frames::Frame;
use tracing::trace;

use crate::error::MonitorError;
use crate::spatial::{self, Rect};
use crate::window::Window;

#[derive(Debug, Clone)]
enum EvalValue {
    Bool(bool),
    Time(f64),
    Frame(i64),
    Object(String),
    Spatial(Vec<Rect>),
}

impl EvalValue {
    fn bool(self) -> bool {
        match self {
            EvalValue::Bool(b) => b,
            other => unreachable!("non-Boolean value {other:?} reached a Boolean context"),
        }
    }
    fn time(self) -> f64 {
        match self {
            EvalValue::Time(t) => t,
            other => unreachable!("non-TimeValue value {other:?} reached a time context"),
        }
    }
    fn frame(self) -> i64 {
        match self {
            EvalValue::Frame(f) => f,
            other => unreachable!("non-FrameValue value {other:?} reached a frame context"),
        }
    }
    fn object(self) -> String {
        match self {
            EvalValue::Object(id) => id,
            other => unreachable!("non-ObjectRef value {other:?} reached an object context"),
        }
    }
    fn spatial(self) -> Vec<Rect> {
        match self {
            EvalValue::Spatial(r) => r,
            other => unreachable!("non-Spatial value {other:?} reached a spatial context"),
        }
    }
}

fn frame_at<'w>(window: &'w Window, tick: u64) -> Option<&'w Frame> {
    window.get(tick)
}

/// Evaluate `expr` (must be `ExprKind::Boolean`) at `env.tick` against `window`.
pub fn eval_bool(expr: &Expr, env: &Env, window: &Window) -> Result<bool, MonitorError> {
    Ok(eval(expr, env, window)?.bool())
}

fn eval(expr: &Expr, env: &Env, window: &Window) -> Result<EvalValue, MonitorError> {
    use ExprNode::*;
    let value = match &**expr {
        ConstBool(b) => EvalValue::Bool(*b),

        TimeVar(name) => {
            let v = *env
                .time_bindings
                .get(name)
                .ok_or_else(|| MonitorError::Ast(stql_ast::AstError::unbound(name.clone())))?;
            EvalValue::Time(v)
        }
        FrameVar(name) => {
            let v = *env
                .frame_bindings
                .get(name)
                .ok_or_else(|| MonitorError::Ast(stql_ast::AstError::unbound(name.clone())))?;
            EvalValue::Frame(v)
        }
        ObjectVar(name) => {
            let id = env
                .object_bindings
                .get(name)
                .ok_or_else(|| MonitorError::Ast(stql_ast::AstError::unbound(name.clone())))?
                .clone();
            EvalValue::Object(id)
        }
        CTime => {
            let ts = frame_at(window, env.tick).map(|f| f.timestamp).unwrap_or(0.0);
            EvalValue::Time(ts)
        }
        CFrame => {
            let fnum = frame_at(window, env.tick)
                .map(|f| f.frame_num as i64)
                .unwrap_or(0);
            EvalValue::Frame(fnum)
        }

        TimeDiff(lhs, rhs) => {
            let l = eval(lhs, env, window)?.time();
            let r = eval(rhs, env, window)?.time();
            EvalValue::Time(l - r)
        }
        FrameDiff(lhs, rhs) => {
            let l = eval(lhs, env, window)?.frame();
            let r = eval(rhs, env, window)?.frame();
            EvalValue::Frame(l - r)
        }

        TimeBound(diff, op, value) => {
            let d = eval(diff, env, window)?.time();
            EvalValue::Bool(compare(d, *op, value.0))
        }
        FrameBound(diff, op, value) => {
            let d = eval(diff, env, window)?.frame();
            EvalValue::Bool(compare(d, *op, *value))
        }

        Not(inner) => EvalValue::Bool(!eval_bool(inner, env, window)?),
        And(operands) => {
            let mut all = true;
            for o in operands {
                if !eval_bool(o, env, window)? {
                    all = false;
                    break;
                }
            }
            EvalValue::Bool(all)
        }
        Or(operands) => {
            let mut any = false;
            for o in operands {
                if eval_bool(o, env, window)? {
                    any = true;
                    break;
                }
            }
            EvalValue::Bool(any)
        }

        Exists(vars, body) => EvalValue::Bool(eval_quantifier(vars, body, env, window, true)?),
        Forall(vars, body) => EvalValue::Bool(eval_quantifier(vars, body, env, window, false)?),

        Next(inner, steps) => {
            let target = env.tick + u64::from(*steps);
            if frame_at(window, target).is_some() {
                EvalValue::Bool(eval_bool(inner, &env.with_tick(target), window)?)
            } else {
                trace!(target: "monitor.eval", tick = env.tick, steps, "Next provisional: future frame not yet available");
                EvalValue::Bool(false)
            }
        }
        Previous(inner, steps) => {
            let steps = u64::from(*steps);
            if env.tick >= steps && frame_at(window, env.tick - steps).is_some() {
                EvalValue::Bool(eval_bool(inner, &env.with_tick(env.tick - steps), window)?)
            } else {
                EvalValue::Bool(false)
            }
        }
        Always(inner) => {
            let last = window.last_position().unwrap_or(env.tick);
            let mut all = true;
            let mut t = env.tick;
            while t <= last {
                if !eval_bool(inner, &env.with_tick(t), window)? {
                    all = false;
                    break;
                }
                t += 1;
            }
            EvalValue::Bool(all)
        }
        Eventually(inner) => {
            let last = window.last_position().unwrap_or(env.tick);
            let mut any = false;
            let mut t = env.tick;
            while t <= last {
                if eval_bool(inner, &env.with_tick(t), window)? {
                    any = true;
                    break;
                }
                t += 1;
            }
            EvalValue::Bool(any)
        }
        Until(a, b) => {
            let last = window.last_position().unwrap_or(env.tick);
            let mut found = false;
            let mut i = env.tick;
            while i <= last {
                if eval_bool(b, &env.with_tick(i), window)? {
                    found = true;
                    break;
                }
                if !eval_bool(a, &env.with_tick(i), window)? {
                    break;
                }
                i += 1;
            }
            EvalValue::Bool(found)
        }
        Since(a, b) => {
            let first = window.first_position();
            let mut found = false;
            let mut i = env.tick;
            loop {
                if eval_bool(b, &env.with_tick(i), window)? {
                    found = true;
                    break;
                }
                if i == first || !eval_bool(a, &env.with_tick(i), window)? {
                    break;
                }
                i -= 1;
            }
            EvalValue::Bool(found)
        }

        Freeze(bindings, body) => {
            let mut next = env.clone();
            if let Some(frame) = frame_at(window, env.tick) {
                if let Some(name) = &bindings.time {
                    next.time_bindings.insert(name.clone(), frame.timestamp);
                }
                if let Some(name) = &bindings.frame {
                    next.frame_bindings.insert(name.clone(), frame.frame_num as i64);
                }
            }
            EvalValue::Bool(eval_bool(body, &next, window)?)
        }

        IsClass(objvar, class_id) => {
            let id = eval(objvar, env, window)?.object();
            let held = frame_at(window, env.tick)
                .and_then(|f| f.objects.get(&id))
                .map(|o| o.object_class == *class_id)
                .unwrap_or(false);
            EvalValue::Bool(held)
        }
        HighConfidence(objvar, threshold) => {
            let id = eval(objvar, env, window)?.object();
            let held = frame_at(window, env.tick)
                .and_then(|f| f.objects.get(&id))
                .map(|o| o.probability >= threshold.0)
                .unwrap_or(false);
            EvalValue::Bool(held)
        }
        LowConfidence(objvar, threshold) => {
            let id = eval(objvar, env, window)?.object();
            let held = frame_at(window, env.tick)
                .and_then(|f| f.objects.get(&id))
                .map(|o| o.probability <= threshold.0)
                .unwrap_or(false);
            EvalValue::Bool(held)
        }

        EmptySet => EvalValue::Spatial(vec![]),
        Universe => {
            let u = frame_at(window, env.tick)
                .map(|f| f.universe_bbox())
                .unwrap_or_default();
            EvalValue::Spatial(vec![u])
        }
        BBoxExpr(objvar) => {
            let id = eval(objvar, env, window)?.object();
            let rects = frame_at(window, env.tick)
                .and_then(|f| f.objects.get(&id))
                .map(|o| vec![o.bbox])
                .unwrap_or_default();
            EvalValue::Spatial(rects)
        }
        SpatialComplement(inner) => {
            let cover = eval(inner, env, window)?.spatial();
            let universe = frame_at(window, env.tick)
                .map(|f| f.universe_bbox())
                .unwrap_or_default();
            EvalValue::Spatial(spatial::complement(&cover, &universe))
        }
        SpatialUnion(operands) => {
            let mut acc = Vec::new();
            for o in operands {
                acc = spatial::union(acc, eval(o, env, window)?.spatial());
            }
            EvalValue::Spatial(acc)
        }
        SpatialIntersect(operands) => {
            let mut iter = operands.iter();
            let Some(first) = iter.next() else {
                return Ok(EvalValue::Spatial(vec![]));
            };
            let mut acc = eval(first, env, window)?.spatial();
            for o in iter {
                acc = spatial::intersect_covers(&acc, &eval(o, env, window)?.spatial());
            }
            EvalValue::Spatial(acc)
        }
        SpatialExists(inner) => {
            let cover = eval(inner, env, window)?.spatial();
            EvalValue::Bool(spatial::is_nonempty(&cover))
        }
        SpatialForall(inner) => {
            let cover = eval(inner, env, window)?.spatial();
            let universe = frame_at(window, env.tick)
                .map(|f| f.universe_bbox())
                .unwrap_or_default();
            EvalValue::Bool(spatial::covers_universe(&cover, &universe))
        }
    };
    Ok(value)
}

fn compare<T: PartialOrd>(lhs: T, op: CompareOp, rhs: T) -> bool {
    op.apply(lhs, rhs)
}

/// Enumerate every binding of `vars` to distinct-per-variable object IDs
/// present in the current-tick frame (cartesian product over `vars`),
/// short-circuiting per the quantifier's `is_exists` polarity. IDs present
/// in the frame's object map are visited in its iteration order, which is
/// unspecified but does not affect the resulting Boolean.
fn eval_quantifier(
    vars: &[Expr],
    body: &Expr,
    env: &Env,
    window: &Window,
    is_exists: bool,
) -> Result<bool, MonitorError> {
    let names: Vec<&str> = vars
        .iter()
        .map(|v| match &**v {
            ExprNode::ObjectVar(name) => name.as_str(),
            _ => unreachable!("quantifier binder is always an ObjectVar"),
        })
        .collect();

    let ids: Vec<String> = frame_at(window, env.tick)
        .map(|f| f.objects.keys().cloned().collect())
        .unwrap_or_default();

    if ids.is_empty() {
        return Ok(!is_exists);
    }

    for assignment in cartesian_product(names.len(), &ids) {
        let mut next = env.clone();
        for (name, id) in names.iter().zip(assignment.iter()) {
            next = next.with_object_binding(name, id);
        }
        let holds = eval_bool(body, &next, window)?;
        if is_exists && holds {
            return Ok(true);
        }
        if !is_exists && !holds {
            return Ok(false);
        }
    }
    Ok(!is_exists)
}

fn cartesian_product(arity: usize, ids: &[String]) -> Vec<Vec<String>> {
    let mut out = vec![Vec::new()];
    for _ in 0..arity {
        let mut next = Vec::with_capacity(out.len() * ids.len());
        for prefix in &out {
            for id in ids {
                let mut p = prefix.clone();
                p.push(id.clone());
                next.push(p);
            }
        }
        out = next;
    }
    out
}
