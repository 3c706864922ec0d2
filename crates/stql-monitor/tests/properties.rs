use proptest::prelude::*;

use stql_ast::expr::factory::*;
use stql_ast::sugar;
use stql_frames::{BoundingBox, Frame, Object};
use stql_monitor::OnlineMonitor;

fn car_formula() -> stql_ast::Expr {
    let body = exists(vec![object_var("car")], sugar::is_class("car", 1).unwrap()).unwrap();
    next1(body).unwrap()
}

fn make_frame(n: u64, has_car: bool) -> Frame {
    let mut f = Frame::new(n, n as f64 / 30.0, 1920, 1080);
    if has_car {
        f.objects.insert(
            "car_1".into(),
            Object::new(1, 0.9, BoundingBox::new(100.0, 200.0, 50.0, 150.0)),
        );
    }
    f
}

proptest! {
    /// Two fresh monitors over the same formula and frame sequence produce
    /// identical verdicts at every tick.
    #[test]
    fn determinism(flags in prop::collection::vec(any::<bool>(), 1..30)) {
        let mut m1 = OnlineMonitor::new(car_formula(), 30.0).unwrap();
        let mut m2 = OnlineMonitor::new(car_formula(), 30.0).unwrap();
        for (n, has_car) in flags.iter().enumerate() {
            let v1 = m1.evaluate(make_frame(n as u64, *has_car)).unwrap();
            let v2 = m2.evaluate(make_frame(n as u64, *has_car)).unwrap();
            prop_assert_eq!(v1, v2);
        }
    }

    /// Once steady, appending more frames beyond a committed tick's horizon
    /// does not change the verdict already returned for it.
    #[test]
    fn steady_state_finality(
        prefix in prop::collection::vec(any::<bool>(), 3..15),
        extra_after in prop::collection::vec(any::<bool>(), 0..10),
    ) {
        let mut baseline = OnlineMonitor::new(car_formula(), 30.0).unwrap();
        let mut verdicts = Vec::new();
        for (n, has_car) in prefix.iter().enumerate() {
            verdicts.push(baseline.evaluate(make_frame(n as u64, *has_car)).unwrap());
        }

        let mut extended = OnlineMonitor::new(car_formula(), 30.0).unwrap();
        let mut extended_verdicts = Vec::new();
        let mut n = 0u64;
        for has_car in prefix.iter().chain(extra_after.iter()) {
            extended_verdicts.push(extended.evaluate(make_frame(n, *has_car)).unwrap());
            n += 1;
        }

        // Every verdict already committed in `baseline` (all but the last,
        // still-provisional tick, since horizon = 1) must match the same
        // tick's verdict once more frames keep arriving.
        let committed_len = verdicts.len().saturating_sub(1);
        prop_assert_eq!(&verdicts[..committed_len], &extended_verdicts[..committed_len]);
    }

    /// The monitor's window never exceeds the capacity implied by its
    /// requirements, however long the stream runs.
    #[test]
    fn bounded_window_size(flags in prop::collection::vec(any::<bool>(), 0..200)) {
        let mut m = OnlineMonitor::new(car_formula(), 30.0).unwrap();
        let req = m.requirements();
        let cap = req.history.as_u64().unwrap() + req.horizon.as_u64().unwrap() + 1;
        for (n, has_car) in flags.iter().enumerate() {
            m.evaluate(make_frame(n as u64, *has_car)).unwrap();
        }
        prop_assert!(m.requirements().history.as_u64().unwrap() <= cap);
    }
}
