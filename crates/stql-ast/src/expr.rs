//! The STQL expression algebra.
//!
//! Every formula is an [`Expr`] — a reference-counted handle to an
//! [`ExprNode`] — so that repeated sub-formulas can share structure rather
//! than being cloned. Trees are immutable once built: there is no node
//! mutation anywhere in this crate, only construction of new nodes from
//! old ones via the factory functions on [`Expr`].

use std::fmt;
use std::rc::Rc;

use crate::error::AstError;

/// A handle to a (possibly shared) formula node.
pub type Expr = Rc<ExprNode>;

/// Comparison operator used by bound expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl CompareOp {
    pub fn apply<T: PartialOrd>(self, lhs: T, rhs: T) -> bool {
        match self {
            CompareOp::Lt => lhs < rhs,
            CompareOp::Le => lhs <= rhs,
            CompareOp::Gt => lhs > rhs,
            CompareOp::Ge => lhs >= rhs,
            CompareOp::Eq => lhs == rhs,
            CompareOp::Ne => lhs != rhs,
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CompareOp::Lt => "<",
            CompareOp::Le => "\u{2264}",
            CompareOp::Gt => ">",
            CompareOp::Ge => "\u{2265}",
            CompareOp::Eq => "=",
            CompareOp::Ne => "\u{2260}",
        };
        f.write_str(s)
    }
}

/// Which tick-local constants a [`ExprNode::Freeze`] captures, and which
/// variable names it binds them to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreezeBindings {
    pub time: Option<String>,
    pub frame: Option<String>,
}

/// Every variant of the STQL expression algebra: the closed tagged union
/// over the Boolean, first-order, temporal, freeze, and spatial fragments.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprNode {
    // Leaves
    ConstBool(bool),
    TimeVar(String),
    FrameVar(String),
    ObjectVar(String),
    CTime,
    CFrame,

    // Arithmetic over frame coordinates
    TimeDiff(Expr, Expr),
    FrameDiff(Expr, Expr),

    // Bounds
    TimeBound(Expr, CompareOp, OrderedF64),
    FrameBound(Expr, CompareOp, i64),

    // Boolean
    Not(Expr),
    And(Vec<Expr>),
    Or(Vec<Expr>),

    // Quantifiers
    Exists(Vec<Expr>, Expr),
    Forall(Vec<Expr>, Expr),

    // Temporal
    Next(Expr, u32),
    Previous(Expr, u32),
    Always(Expr),
    Eventually(Expr),
    Until(Expr, Expr),
    Since(Expr, Expr),

    // Freeze
    Freeze(FreezeBindings, Expr),

    // Perception atoms
    IsClass(Expr, i64),
    HighConfidence(Expr, OrderedF64),
    LowConfidence(Expr, OrderedF64),

    // Spatial algebra
    EmptySet,
    Universe,
    BBoxExpr(Expr),
    SpatialComplement(Expr),
    SpatialUnion(Vec<Expr>),
    SpatialIntersect(Vec<Expr>),
    SpatialExists(Expr),
    SpatialForall(Expr),
}

/// `f64` wrapper that is `PartialEq` in the bitwise sense needed for
/// structural AST equality (`NaN` never appears in well-formed formulas,
/// but we don't want an accidental `NaN != NaN` to make an otherwise
/// identical tree compare unequal to itself).
#[derive(Debug, Clone, Copy)]
pub struct OrderedF64(pub f64);

impl PartialEq for OrderedF64 {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl From<f64> for OrderedF64 {
    fn from(v: f64) -> Self {
        OrderedF64(v)
    }
}

impl fmt::Display for OrderedF64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Static type of an expression node, used by factories to reject
/// ill-typed formulas at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprKind {
    Boolean,
    Spatial,
    TimeValue,
    FrameValue,
    ObjectRef,
}

/// Compute the static type of a node. Kind is a function of the node's own
/// variant (plus, for `Freeze`, its body) — never of evaluating children,
/// since children were already type-checked when the node was built.
pub fn kind(e: &Expr) -> ExprKind {
    use ExprNode::*;
    match &**e {
        ConstBool(_) => ExprKind::Boolean,
        TimeVar(_) | CTime => ExprKind::TimeValue,
        FrameVar(_) | CFrame => ExprKind::FrameValue,
        ObjectVar(_) => ExprKind::ObjectRef,
        TimeDiff(..) => ExprKind::TimeValue,
        FrameDiff(..) => ExprKind::FrameValue,
        TimeBound(..) | FrameBound(..) => ExprKind::Boolean,
        Not(_) | And(_) | Or(_) => ExprKind::Boolean,
        Exists(..) | Forall(..) => ExprKind::Boolean,
        Next(..) | Previous(..) | Always(_) | Eventually(_) | Until(..) | Since(..) => {
            ExprKind::Boolean
        }
        Freeze(_, body) => kind(body),
        IsClass(..) | HighConfidence(..) | LowConfidence(..) => ExprKind::Boolean,
        EmptySet | Universe => ExprKind::Spatial,
        BBoxExpr(_) => ExprKind::Spatial,
        SpatialComplement(_) | SpatialUnion(_) | SpatialIntersect(_) => ExprKind::Spatial,
        SpatialExists(_) | SpatialForall(_) => ExprKind::Boolean,
    }
}

fn require(cond: bool, reason: impl Into<String>) -> Result<(), AstError> {
    if cond {
        Ok(())
    } else {
        Err(AstError::malformed(reason))
    }
}

fn require_kind(e: &Expr, want: ExprKind, who: &str) -> Result<(), AstError> {
    let got = kind(e);
    require(
        got == want,
        format!("{who} expects a {want:?} operand, got {got:?}"),
    )
}

fn require_object_var(e: &Expr, who: &str) -> Result<(), AstError> {
    require(
        matches!(&**e, ExprNode::ObjectVar(_)),
        format!("{who} expects an ObjectVar, got {e:?}"),
    )
}

/// Construction factories. One function per [`ExprNode`] variant; every
/// factory performs the well-formedness checks required before it hands
/// back a node (non-empty operand lists, correctly typed children,
/// positive step counts, bound variables occurring free in their body).
pub mod factory {
    use super::*;

    pub fn const_bool(b: bool) -> Expr {
        Rc::new(ExprNode::ConstBool(b))
    }

    pub fn make_true() -> Expr {
        const_bool(true)
    }

    pub fn make_false() -> Expr {
        const_bool(false)
    }

    pub fn time_var(name: impl Into<String>) -> Expr {
        Rc::new(ExprNode::TimeVar(name.into()))
    }

    pub fn frame_var(name: impl Into<String>) -> Expr {
        Rc::new(ExprNode::FrameVar(name.into()))
    }

    pub fn object_var(name: impl Into<String>) -> Expr {
        Rc::new(ExprNode::ObjectVar(name.into()))
    }

    pub fn c_time() -> Expr {
        Rc::new(ExprNode::CTime)
    }

    pub fn c_frame() -> Expr {
        Rc::new(ExprNode::CFrame)
    }

    pub fn time_diff(lhs: Expr, rhs: Expr) -> Result<Expr, AstError> {
        for (side, e) in [("lhs", &lhs), ("rhs", &rhs)] {
            require(
                matches!(&**e, ExprNode::TimeVar(_) | ExprNode::CTime),
                format!("TimeDiff {side} must be a TimeVar or C_TIME"),
            )?;
        }
        Ok(Rc::new(ExprNode::TimeDiff(lhs, rhs)))
    }

    pub fn frame_diff(lhs: Expr, rhs: Expr) -> Result<Expr, AstError> {
        for (side, e) in [("lhs", &lhs), ("rhs", &rhs)] {
            require(
                matches!(&**e, ExprNode::FrameVar(_) | ExprNode::CFrame),
                format!("FrameDiff {side} must be a FrameVar or C_FRAME"),
            )?;
        }
        Ok(Rc::new(ExprNode::FrameDiff(lhs, rhs)))
    }

    pub fn time_bound(diff: Expr, op: CompareOp, value: f64) -> Result<Expr, AstError> {
        require(
            matches!(&*diff, ExprNode::TimeDiff(..)),
            "TimeBoundExpr requires a TimeDiff operand",
        )?;
        Ok(Rc::new(ExprNode::TimeBound(diff, op, value.into())))
    }

    pub fn frame_bound(diff: Expr, op: CompareOp, value: i64) -> Result<Expr, AstError> {
        require(
            matches!(&*diff, ExprNode::FrameDiff(..)),
            "FrameBoundExpr requires a FrameDiff operand",
        )?;
        Ok(Rc::new(ExprNode::FrameBound(diff, op, value)))
    }

    pub fn not(inner: Expr) -> Result<Expr, AstError> {
        require_kind(&inner, ExprKind::Boolean, "Not")?;
        Ok(Rc::new(ExprNode::Not(inner)))
    }

    pub fn and(operands: Vec<Expr>) -> Result<Expr, AstError> {
        require(!operands.is_empty(), "And requires at least one operand")?;
        for e in &operands {
            require_kind(e, ExprKind::Boolean, "And")?;
        }
        if operands.len() == 1 {
            return Ok(operands.into_iter().next().unwrap());
        }
        Ok(Rc::new(ExprNode::And(operands)))
    }

    pub fn or(operands: Vec<Expr>) -> Result<Expr, AstError> {
        require(!operands.is_empty(), "Or requires at least one operand")?;
        for e in &operands {
            require_kind(e, ExprKind::Boolean, "Or")?;
        }
        if operands.len() == 1 {
            return Ok(operands.into_iter().next().unwrap());
        }
        Ok(Rc::new(ExprNode::Or(operands)))
    }

    fn check_quantifier_vars(vars: &[Expr], who: &str) -> Result<(), AstError> {
        require(!vars.is_empty(), format!("{who} requires at least one bound variable"))?;
        let mut seen = std::collections::HashSet::new();
        for v in vars {
            require_object_var(v, who)?;
            let ExprNode::ObjectVar(name) = &**v else {
                unreachable!("checked above");
            };
            require(
                seen.insert(name.clone()),
                format!("{who} binds {name} more than once"),
            )?;
        }
        Ok(())
    }

    /// Free object-variable names occurring in `body` (a conservative,
    /// whole-tree scan — sufficient since STQL formulas are small and this
    /// only runs at construction time).
    fn free_object_vars(body: &Expr, out: &mut std::collections::HashSet<String>) {
        use ExprNode::*;
        match &**body {
            ObjectVar(name) => {
                out.insert(name.clone());
            }
            Not(e) | Always(e) | Eventually(e) | BBoxExpr(e) | SpatialComplement(e)
            | SpatialExists(e) | SpatialForall(e) => free_object_vars(e, out),
            And(es) | Or(es) | SpatialUnion(es) | SpatialIntersect(es) => {
                for e in es {
                    free_object_vars(e, out);
                }
            }
            Exists(vars, b) | Forall(vars, b) => {
                let mut inner = std::collections::HashSet::new();
                free_object_vars(b, &mut inner);
                let bound: std::collections::HashSet<_> = vars
                    .iter()
                    .filter_map(|v| match &**v {
                        ObjectVar(n) => Some(n.clone()),
                        _ => None,
                    })
                    .collect();
                out.extend(inner.difference(&bound).cloned());
            }
            Next(e, _) | Previous(e, _) => free_object_vars(e, out),
            Until(a, b) | Since(a, b) => {
                free_object_vars(a, out);
                free_object_vars(b, out);
            }
            Freeze(_, b) => free_object_vars(b, out),
            IsClass(v, _) | HighConfidence(v, _) | LowConfidence(v, _) => free_object_vars(v, out),
            TimeDiff(..) | FrameDiff(..) | TimeBound(..) | FrameBound(..) | ConstBool(_)
            | TimeVar(_) | FrameVar(_) | CTime | CFrame | EmptySet | Universe => {}
        }
    }

    pub fn exists(vars: Vec<Expr>, body: Expr) -> Result<Expr, AstError> {
        check_quantifier_vars(&vars, "Exists")?;
        require_kind(&body, ExprKind::Boolean, "Exists body")?;
        let mut free = std::collections::HashSet::new();
        free_object_vars(&body, &mut free);
        for v in &vars {
            let ExprNode::ObjectVar(name) = &**v else {
                unreachable!();
            };
            require(
                free.contains(name),
                format!("Exists binds {name} which does not appear free in its body"),
            )?;
        }
        Ok(Rc::new(ExprNode::Exists(vars, body)))
    }

    pub fn forall(vars: Vec<Expr>, body: Expr) -> Result<Expr, AstError> {
        check_quantifier_vars(&vars, "Forall")?;
        require_kind(&body, ExprKind::Boolean, "Forall body")?;
        let mut free = std::collections::HashSet::new();
        free_object_vars(&body, &mut free);
        for v in &vars {
            let ExprNode::ObjectVar(name) = &**v else {
                unreachable!();
            };
            require(
                free.contains(name),
                format!("Forall binds {name} which does not appear free in its body"),
            )?;
        }
        Ok(Rc::new(ExprNode::Forall(vars, body)))
    }

    pub fn next(inner: Expr, steps: u32) -> Result<Expr, AstError> {
        require(steps > 0, "Next requires steps > 0")?;
        require_kind(&inner, ExprKind::Boolean, "Next")?;
        Ok(Rc::new(ExprNode::Next(inner, steps)))
    }

    pub fn next1(inner: Expr) -> Result<Expr, AstError> {
        next(inner, 1)
    }

    pub fn previous(inner: Expr, steps: u32) -> Result<Expr, AstError> {
        require(steps > 0, "Previous requires steps > 0")?;
        require_kind(&inner, ExprKind::Boolean, "Previous")?;
        Ok(Rc::new(ExprNode::Previous(inner, steps)))
    }

    pub fn previous1(inner: Expr) -> Result<Expr, AstError> {
        previous(inner, 1)
    }

    pub fn always(inner: Expr) -> Result<Expr, AstError> {
        require_kind(&inner, ExprKind::Boolean, "Always")?;
        Ok(Rc::new(ExprNode::Always(inner)))
    }

    pub fn eventually(inner: Expr) -> Result<Expr, AstError> {
        require_kind(&inner, ExprKind::Boolean, "Eventually")?;
        Ok(Rc::new(ExprNode::Eventually(inner)))
    }

    pub fn until(lhs: Expr, rhs: Expr) -> Result<Expr, AstError> {
        require_kind(&lhs, ExprKind::Boolean, "Until lhs")?;
        require_kind(&rhs, ExprKind::Boolean, "Until rhs")?;
        Ok(Rc::new(ExprNode::Until(lhs, rhs)))
    }

    pub fn since(lhs: Expr, rhs: Expr) -> Result<Expr, AstError> {
        require_kind(&lhs, ExprKind::Boolean, "Since lhs")?;
        require_kind(&rhs, ExprKind::Boolean, "Since rhs")?;
        Ok(Rc::new(ExprNode::Since(lhs, rhs)))
    }

    pub fn freeze(bindings: Vec<Expr>, body: Expr) -> Result<Expr, AstError> {
        require(!bindings.is_empty(), "Freeze requires at least one binding")?;
        require_kind(&body, ExprKind::Boolean, "Freeze body")?;
        let mut fb = FreezeBindings {
            time: None,
            frame: None,
        };
        for b in &bindings {
            match &**b {
                ExprNode::TimeVar(name) => {
                    require(fb.time.is_none(), "Freeze binds more than one TimeVar")?;
                    fb.time = Some(name.clone());
                }
                ExprNode::FrameVar(name) => {
                    require(fb.frame.is_none(), "Freeze binds more than one FrameVar")?;
                    fb.frame = Some(name.clone());
                }
                _ => return Err(AstError::malformed("Freeze bindings must be TimeVar or FrameVar")),
            }
        }
        Ok(Rc::new(ExprNode::Freeze(fb, body)))
    }

    pub fn is_class(objvar: Expr, class_id: i64) -> Result<Expr, AstError> {
        require_object_var(&objvar, "IsClass")?;
        Ok(Rc::new(ExprNode::IsClass(objvar, class_id)))
    }

    pub fn high_confidence(objvar: Expr, threshold: f64) -> Result<Expr, AstError> {
        require_object_var(&objvar, "HighConfidence")?;
        Ok(Rc::new(ExprNode::HighConfidence(objvar, threshold.into())))
    }

    pub fn low_confidence(objvar: Expr, threshold: f64) -> Result<Expr, AstError> {
        require_object_var(&objvar, "LowConfidence")?;
        Ok(Rc::new(ExprNode::LowConfidence(objvar, threshold.into())))
    }

    pub fn empty_set() -> Expr {
        Rc::new(ExprNode::EmptySet)
    }

    pub fn universe() -> Expr {
        Rc::new(ExprNode::Universe)
    }

    pub fn bbox(objvar: Expr) -> Result<Expr, AstError> {
        require_object_var(&objvar, "BBoxExpr")?;
        Ok(Rc::new(ExprNode::BBoxExpr(objvar)))
    }

    pub fn spatial_complement(inner: Expr) -> Result<Expr, AstError> {
        require_kind(&inner, ExprKind::Spatial, "SpatialComplement")?;
        Ok(Rc::new(ExprNode::SpatialComplement(inner)))
    }

    pub fn spatial_union(operands: Vec<Expr>) -> Result<Expr, AstError> {
        require(!operands.is_empty(), "SpatialUnion requires at least one operand")?;
        for e in &operands {
            require_kind(e, ExprKind::Spatial, "SpatialUnion")?;
        }
        if operands.len() == 1 {
            return Ok(operands.into_iter().next().unwrap());
        }
        Ok(Rc::new(ExprNode::SpatialUnion(operands)))
    }

    pub fn spatial_intersect(operands: Vec<Expr>) -> Result<Expr, AstError> {
        require(
            !operands.is_empty(),
            "SpatialIntersect requires at least one operand",
        )?;
        for e in &operands {
            require_kind(e, ExprKind::Spatial, "SpatialIntersect")?;
        }
        if operands.len() == 1 {
            return Ok(operands.into_iter().next().unwrap());
        }
        Ok(Rc::new(ExprNode::SpatialIntersect(operands)))
    }

    pub fn spatial_exists(inner: Expr) -> Result<Expr, AstError> {
        require_kind(&inner, ExprKind::Spatial, "SpatialExists")?;
        Ok(Rc::new(ExprNode::SpatialExists(inner)))
    }

    pub fn spatial_forall(inner: Expr) -> Result<Expr, AstError> {
        require_kind(&inner, ExprKind::Spatial, "SpatialForall")?;
        Ok(Rc::new(ExprNode::SpatialForall(inner)))
    }
}
