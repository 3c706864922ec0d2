use proptest::prelude::*;

use stql_ast::expr::factory::*;
use stql_ast::sugar;
use stql_analyze::{compute_requirements, is_past_time_formula, Bound};

fn atom() -> stql_ast::Expr {
    sugar::is_class("car", 1).unwrap()
}

proptest! {
    /// Wrapping a formula in `Previous(_, k)` never decreases its history
    /// requirement relative to the bare atom.
    #[test]
    fn previous_never_decreases_history(k in 1u32..500) {
        let inner = atom();
        let inner_req = compute_requirements(&inner, 30.0).unwrap();
        let wrapped = previous(inner, k).unwrap();
        let wrapped_req = compute_requirements(&wrapped, 30.0).unwrap();
        prop_assert!(wrapped_req.history >= inner_req.history);
        prop_assert_eq!(wrapped_req.horizon, inner_req.horizon);
    }

    /// Same shape, for `Next`/horizon.
    #[test]
    fn next_never_decreases_horizon(k in 1u32..500) {
        let inner = atom();
        let inner_req = compute_requirements(&inner, 30.0).unwrap();
        let wrapped = next(inner, k).unwrap();
        let wrapped_req = compute_requirements(&wrapped, 30.0).unwrap();
        prop_assert!(wrapped_req.horizon >= inner_req.horizon);
        prop_assert_eq!(wrapped_req.history, inner_req.history);
    }

    /// `And`/`Or` aggregate via `max`, so they never require less than
    /// either operand.
    #[test]
    fn and_never_requires_less_than_either_operand(
        ka in 1u32..50, kb in 1u32..50,
    ) {
        let a = previous(atom(), ka).unwrap();
        let b = previous(atom(), kb).unwrap();
        let a_req = compute_requirements(&a, 30.0).unwrap();
        let b_req = compute_requirements(&b, 30.0).unwrap();
        let conj = and(vec![a, b]).unwrap();
        let conj_req = compute_requirements(&conj, 30.0).unwrap();
        prop_assert!(conj_req.history >= a_req.history);
        prop_assert!(conj_req.history >= b_req.history);
    }

    /// `is_past_time_formula` agrees with `horizon == 0` across a mix of
    /// past- and future-leaning shapes.
    #[test]
    fn past_time_correspondence(k in 1u32..100, use_next in any::<bool>()) {
        let f = if use_next {
            next(atom(), k).unwrap()
        } else {
            previous(atom(), k).unwrap()
        };
        let req = compute_requirements(&f, 30.0).unwrap();
        let past_time = is_past_time_formula(&f).unwrap();
        prop_assert_eq!(past_time, req.horizon == Bound::Finite(0));
    }
}

#[test]
fn since_until_asymmetry_is_pinned() {
    let a = atom();
    let b = sugar::high_confidence("car", 0.5).unwrap();
    let since_req = compute_requirements(&since(a.clone(), b.clone()).unwrap(), 30.0).unwrap();
    let until_req = compute_requirements(&until(a, b).unwrap(), 30.0).unwrap();
    assert_eq!(since_req.history, Bound::Unbounded);
    assert_eq!(since_req.horizon, Bound::Finite(0));
    assert_eq!(until_req.history, Bound::Finite(0));
    assert_eq!(until_req.horizon, Bound::Unbounded);
}
