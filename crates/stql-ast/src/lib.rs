//! The STQL expression algebra: AST nodes, well-formedness-checked
//! factories, a pretty-printer, and the `Fold` traversal trait shared by
//! `stql-analyze`.

pub mod error;
pub mod expr;
pub mod fold;
pub mod print;
pub mod sugar;

pub use error::AstError;
pub use expr::{factory, kind, CompareOp, Expr, ExprKind, ExprNode, FreezeBindings, OrderedF64};
pub use fold::{fold, Fold};
pub use print::{to_display_string, DisplayExpr};

#[cfg(test)]
mod tests {
    use super::*;
    use expr::factory::*;

    #[test]
    fn and_rejects_empty_operands() {
        let err = and(vec![]).unwrap_err();
        assert!(matches!(err, AstError::MalformedFormula { .. }));
    }

    #[test]
    fn and_normalizes_singleton() {
        let is_car = sugar::is_class("x", 1).unwrap();
        let wrapped = and(vec![is_car.clone()]).unwrap();
        assert_eq!(wrapped, is_car);
    }

    #[test]
    fn and_rejects_non_boolean_operand() {
        let spatial = empty_set();
        let err = and(vec![spatial]).unwrap_err();
        assert!(matches!(err, AstError::MalformedFormula { .. }));
    }

    #[test]
    fn next_rejects_zero_steps() {
        let body = const_bool(true);
        let err = next(body, 0).unwrap_err();
        assert!(matches!(err, AstError::MalformedFormula { .. }));
    }

    #[test]
    fn time_diff_requires_time_valued_operands() {
        let err = time_diff(frame_var("f"), c_time()).unwrap_err();
        assert!(matches!(err, AstError::MalformedFormula { .. }));

        let ok = time_diff(time_var("t0"), c_time());
        assert!(ok.is_ok());
    }

    #[test]
    fn time_bound_requires_time_diff_operand() {
        let err = time_bound(c_time(), CompareOp::Lt, 1.0).unwrap_err();
        assert!(matches!(err, AstError::MalformedFormula { .. }));

        let diff = time_diff(c_time(), time_var("t0")).unwrap();
        let ok = time_bound(diff, CompareOp::Lt, 1.0);
        assert!(ok.is_ok());
    }

    #[test]
    fn exists_rejects_unbound_body() {
        let body = sugar::is_class("y", 1).unwrap();
        let err = exists(vec![object_var("x")], body).unwrap_err();
        assert!(matches!(err, AstError::MalformedFormula { .. }));
    }

    #[test]
    fn exists_accepts_bound_body() {
        let body = sugar::is_class("x", 1).unwrap();
        let ok = exists(vec![object_var("x")], body);
        assert!(ok.is_ok());
    }

    #[test]
    fn exists_rejects_duplicate_bound_vars() {
        let body = sugar::is_class("x", 1).unwrap();
        let err = exists(vec![object_var("x"), object_var("x")], body).unwrap_err();
        assert!(matches!(err, AstError::MalformedFormula { .. }));
    }

    #[test]
    fn freeze_rejects_duplicate_time_bindings() {
        let body = const_bool(true);
        let err = freeze(vec![time_var("t0"), time_var("t1")], body).unwrap_err();
        assert!(matches!(err, AstError::MalformedFormula { .. }));
    }

    #[test]
    fn freeze_accepts_one_time_and_one_frame_binding() {
        let body = const_bool(true);
        let ok = freeze(vec![time_var("t0"), frame_var("f0")], body);
        assert!(ok.is_ok());
    }

    #[test]
    fn is_class_requires_object_var() {
        let err = is_class(const_bool(true), 1).unwrap_err();
        assert!(matches!(err, AstError::MalformedFormula { .. }));
    }

    #[test]
    fn structural_sharing_gives_free_equality() {
        let a = sugar::is_class("x", 1).unwrap();
        let b = sugar::is_class("x", 1).unwrap();
        assert_eq!(a, b);
        assert!(!std::rc::Rc::ptr_eq(&a, &b));
    }

    #[test]
    fn same_rc_clone_is_ptr_eq() {
        let a = sugar::is_class("x", 1).unwrap();
        let b = a.clone();
        assert!(std::rc::Rc::ptr_eq(&a, &b));
    }

    #[test]
    fn kind_of_spatial_nodes_is_spatial() {
        assert_eq!(kind(&empty_set()), ExprKind::Spatial);
        assert_eq!(kind(&universe()), ExprKind::Spatial);
        let b = bbox(object_var("x")).unwrap();
        assert_eq!(kind(&b), ExprKind::Spatial);
    }

    #[test]
    fn kind_of_freeze_follows_body() {
        let body = sugar::is_class("x", 1).unwrap();
        let f = freeze(vec![time_var("t0")], body).unwrap();
        assert_eq!(kind(&f), ExprKind::Boolean);
    }

    #[test]
    fn print_matches_expected_glyphs() {
        let f = always(sugar::is_class("x", 1).unwrap()).unwrap();
        let text = to_display_string(&f);
        assert_eq!(text, "\u{25a1}C(x) = 1");
    }

    #[test]
    fn print_and_or_not() {
        let a = sugar::is_class("x", 1).unwrap();
        let b = sugar::high_confidence("x", 0.9).unwrap();
        let conj = and(vec![a, b]).unwrap();
        let f = not(conj).unwrap();
        let text = to_display_string(&f);
        assert_eq!(
            text,
            "\u{00ac}(C(x) = 1 \u{2227} P(x) \u{2265} 0.9)"
        );
    }

    #[test]
    fn spatial_union_singleton_normalizes() {
        let e = empty_set();
        let u = spatial_union(vec![e.clone()]).unwrap();
        assert_eq!(u, e);
    }
}
