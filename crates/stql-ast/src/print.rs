//! Unicode pretty-printer for STQL formulas, implemented as a [`Fold`] so
//! it shares the traversal discipline with `stql-analyze`.

use std::fmt;

use crate::expr::{CompareOp, Expr, ExprNode, FreezeBindings, OrderedF64};
use crate::fold::{fold, Fold};

struct Printer;

impl Fold for Printer {
    type Out = String;

    fn const_bool(&self, b: bool) -> Self::Out {
        if b { "\u{22a4}".into() } else { "\u{22a5}".into() }
    }
    fn time_var(&self, name: &str) -> Self::Out {
        name.to_string()
    }
    fn frame_var(&self, name: &str) -> Self::Out {
        name.to_string()
    }
    fn object_var(&self, name: &str) -> Self::Out {
        name.to_string()
    }
    fn c_time(&self) -> Self::Out {
        "t_now".into()
    }
    fn c_frame(&self) -> Self::Out {
        "f_now".into()
    }

    fn time_diff(&self, _lhs_raw: &Expr, _rhs_raw: &Expr, lhs: Self::Out, rhs: Self::Out) -> Self::Out {
        format!("({lhs} - {rhs})")
    }
    fn frame_diff(&self, _lhs_raw: &Expr, _rhs_raw: &Expr, lhs: Self::Out, rhs: Self::Out) -> Self::Out {
        format!("({lhs} - {rhs})")
    }

    fn time_bound(&self, diff: Self::Out, op: CompareOp, value: OrderedF64) -> Self::Out {
        format!("{diff} {op} {value}")
    }
    fn frame_bound(&self, diff: Self::Out, op: CompareOp, value: i64) -> Self::Out {
        format!("{diff} {op} {value}")
    }

    fn not(&self, inner: Self::Out) -> Self::Out {
        format!("\u{00ac}{inner}")
    }
    fn and(&self, operands: Vec<Self::Out>) -> Self::Out {
        format!("({})", operands.join(" \u{2227} "))
    }
    fn or(&self, operands: Vec<Self::Out>) -> Self::Out {
        format!("({})", operands.join(" \u{2228} "))
    }

    fn exists(&self, vars: &[Expr], body: Self::Out) -> Self::Out {
        format!("(\u{2203}{}. {body})", join_vars(vars))
    }
    fn forall(&self, vars: &[Expr], body: Self::Out) -> Self::Out {
        format!("(\u{2200}{}. {body})", join_vars(vars))
    }

    fn next(&self, inner: Self::Out, steps: u32) -> Self::Out {
        if steps == 1 {
            format!("\u{25cb}{inner}")
        } else {
            format!("\u{25cb}^{steps}{inner}")
        }
    }
    fn previous(&self, inner: Self::Out, steps: u32) -> Self::Out {
        if steps == 1 {
            format!("\u{25e6}{inner}")
        } else {
            format!("\u{25e6}^{steps}{inner}")
        }
    }
    fn always(&self, inner: Self::Out) -> Self::Out {
        format!("\u{25a1}{inner}")
    }
    fn eventually(&self, inner: Self::Out) -> Self::Out {
        format!("\u{25c7}{inner}")
    }
    fn until(&self, lhs: Self::Out, rhs: Self::Out) -> Self::Out {
        format!("({lhs} U {rhs})")
    }
    fn since(&self, lhs: Self::Out, rhs: Self::Out) -> Self::Out {
        format!("({lhs} S {rhs})")
    }

    fn freeze(&self, bindings: &FreezeBindings, body: Self::Out) -> Self::Out {
        let mut names = Vec::new();
        if let Some(t) = &bindings.time {
            names.push(t.clone());
        }
        if let Some(fr) = &bindings.frame {
            names.push(fr.clone());
        }
        format!("{{ {} | {body} }}", names.join(", "))
    }

    fn is_class(&self, objvar: Self::Out, class_id: i64) -> Self::Out {
        format!("C({objvar}) = {class_id}")
    }
    fn high_confidence(&self, objvar: Self::Out, threshold: OrderedF64) -> Self::Out {
        format!("P({objvar}) \u{2265} {threshold}")
    }
    fn low_confidence(&self, objvar: Self::Out, threshold: OrderedF64) -> Self::Out {
        format!("P({objvar}) < {threshold}")
    }

    fn empty_set(&self) -> Self::Out {
        "\u{2205}".into()
    }
    fn universe(&self) -> Self::Out {
        "U".into()
    }
    fn bbox(&self, objvar: Self::Out) -> Self::Out {
        format!("BB({objvar})")
    }
    fn spatial_complement(&self, inner: Self::Out) -> Self::Out {
        format!("\u{00ac}{inner}")
    }
    fn spatial_union(&self, operands: Vec<Self::Out>) -> Self::Out {
        format!("({})", operands.join(" \u{2294} "))
    }
    fn spatial_intersect(&self, operands: Vec<Self::Out>) -> Self::Out {
        format!("({})", operands.join(" \u{2293} "))
    }
    fn spatial_exists(&self, inner: Self::Out) -> Self::Out {
        format!("\u{2203}\u{2219}{inner}")
    }
    fn spatial_forall(&self, inner: Self::Out) -> Self::Out {
        format!("\u{2200}\u{2219}{inner}")
    }
}

fn join_vars(vars: &[Expr]) -> String {
    vars.iter()
        .map(|v| match &**v {
            ExprNode::ObjectVar(name) => name.clone(),
            other => format!("{other:?}"),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render a formula in Unicode logic notation.
pub fn to_display_string(e: &Expr) -> String {
    fold(&Printer, e)
}

/// Wrapper so formulas can be used directly with `{}` / `write!`.
pub struct DisplayExpr<'a>(pub &'a Expr);

impl fmt::Display for DisplayExpr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_display_string(self.0))
    }
}
