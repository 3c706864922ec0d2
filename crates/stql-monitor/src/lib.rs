//! Ring-buffered online monitor for STQL formulas.
//!
//! [`OnlineMonitor`] accepts perception [`stql_frames::Frame`]s one at a
//! time and, on each call to [`OnlineMonitor::evaluate`], returns a
//! Boolean verdict for the formula it was constructed with — final once
//! the monitor reaches [`MonitorState::Steady`], provisional during
//! [`MonitorState::Warmup`].

pub mod error;
mod eval;
pub mod spatial;
mod state;
mod window;

pub use error::MonitorError;
pub use eval::Env;
pub use state::MonitorState;
pub use window::Window;

use stql_analyze::{compute_requirements, Requirements};
use stql_ast::Expr;
use stql_frames::Frame;
use tracing::{debug, warn};

/// A stateful evaluator for one STQL formula over one frame stream.
pub struct OnlineMonitor {
    formula: Expr,
    fps: f64,
    requirements: Requirements,
    horizon_limit: u64,
    window: Window,
    last_frame_num: Option<u64>,
    tick_count: u64,
    state: MonitorState,
    error: Option<MonitorError>,
}

impl OnlineMonitor {
    /// Analyze `formula`'s requirements at `fps` and construct a monitor
    /// for it, rejecting formulas with unbounded horizon.
    pub fn new(formula: Expr, fps: f64) -> Result<Self, MonitorError> {
        let requirements = compute_requirements(&formula, fps)?;
        let Some(horizon_limit) = requirements.horizon.as_u64() else {
            return Err(MonitorError::NotMonitorable {
                horizon: requirements.horizon.to_string(),
            });
        };
        let capacity = requirements
            .history
            .as_u64()
            .map(|h| (h + horizon_limit + 1) as usize);
        debug!(
            target: "monitor",
            history = %requirements.history,
            horizon = %requirements.horizon,
            bounded_capacity = ?capacity,
            "monitor constructed"
        );
        Ok(Self {
            formula,
            fps,
            requirements,
            horizon_limit,
            window: Window::new(capacity),
            last_frame_num: None,
            tick_count: 0,
            state: MonitorState::Init,
            error: None,
        })
    }

    pub fn is_monitorable(&self) -> bool {
        !self.requirements.horizon.is_unbounded()
    }

    pub fn requirements(&self) -> Requirements {
        self.requirements
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// Push `frame` onto the window and return the verdict for the
    /// currently committed tick (provisional during warmup, final once
    /// steady). The monitor takes ownership of `frame`.
    pub fn evaluate(&mut self, frame: Frame) -> Result<bool, MonitorError> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }

        if let Some(last) = self.last_frame_num
            && frame.frame_num <= last
        {
            let err = MonitorError::OutOfOrderFrame {
                got: frame.frame_num,
                last,
            };
            self.state = MonitorState::Error;
            self.error = Some(err.clone());
            warn!(target: "monitor", got = frame.frame_num, last, "out-of-order frame, monitor entering Error state");
            return Err(err);
        }
        self.last_frame_num = Some(frame.frame_num);
        self.window.push(frame);
        self.tick_count += 1;
        let n = self.tick_count - 1;

        self.state = if n < self.horizon_limit {
            MonitorState::Warmup
        } else {
            MonitorState::Steady
        };

        let commit = n.saturating_sub(self.horizon_limit);
        let env = Env::at_tick(commit);
        let verdict = eval::eval_bool(&self.formula, &env, &self.window)?;
        if self.state == MonitorState::Warmup {
            debug!(target: "monitor", tick = commit, verdict, "provisional verdict during warmup");
        }
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stql_ast::expr::factory::*;
    use stql_ast::sugar;
    use stql_frames::{BoundingBox, Object};

    fn empty_frame(n: u64) -> Frame {
        Frame::new(n, n as f64 / 30.0, 1920, 1080)
    }

    fn frame_with_car(n: u64, id: &str) -> Frame {
        let mut f = empty_frame(n);
        f.objects.insert(
            id.to_string(),
            Object::new(1, 0.9, BoundingBox::new(100.0, 200.0, 50.0, 150.0)),
        );
        f
    }

    #[test]
    fn const_true_holds_from_an_empty_window() {
        let formula = const_bool(true);
        let mut m = OnlineMonitor::new(formula, 30.0).unwrap();
        assert_eq!(m.requirements().history, stql_analyze::Bound::Finite(0));
        assert_eq!(m.requirements().horizon, stql_analyze::Bound::Finite(0));
        assert!(m.evaluate(empty_frame(0)).unwrap());
    }

    #[test]
    fn exists_detects_class_as_soon_as_object_appears() {
        let body = sugar::is_class("car", 1).unwrap();
        let formula = exists(vec![object_var("car")], body).unwrap();
        let mut m = OnlineMonitor::new(formula, 30.0).unwrap();
        assert!(!m.evaluate(empty_frame(0)).unwrap());
        assert!(m.evaluate(frame_with_car(1, "car_1")).unwrap());
    }

    #[test]
    fn previous_looks_one_tick_back() {
        let body = exists(
            vec![object_var("car")],
            sugar::is_class("car", 1).unwrap(),
        )
        .unwrap();
        let formula = previous1(body).unwrap();
        let req = stql_analyze::compute_requirements(&formula, 30.0).unwrap();
        assert_eq!(req.history, stql_analyze::Bound::Finite(1));
        assert_eq!(req.horizon, stql_analyze::Bound::Finite(0));

        let mut m = OnlineMonitor::new(formula, 30.0).unwrap();
        assert!(!m.evaluate(empty_frame(0)).unwrap());
        assert!(!m.evaluate(frame_with_car(1, "car_1")).unwrap());
        assert!(m.evaluate(empty_frame(2)).unwrap());
    }

    #[test]
    fn next_commits_once_the_future_frame_arrives() {
        let body = exists(
            vec![object_var("car")],
            sugar::is_class("car", 1).unwrap(),
        )
        .unwrap();
        let formula = next1(body).unwrap();
        let req = stql_analyze::compute_requirements(&formula, 30.0).unwrap();
        assert_eq!(req.history, stql_analyze::Bound::Finite(0));
        assert_eq!(req.horizon, stql_analyze::Bound::Finite(1));

        let mut m = OnlineMonitor::new(formula, 30.0).unwrap();
        assert!(m.is_monitorable());
        assert!(!m.evaluate(empty_frame(0)).unwrap());
        assert!(m.evaluate(frame_with_car(1, "car_1")).unwrap());
    }

    #[test]
    fn eventually_is_rejected_as_not_monitorable() {
        let body = exists(
            vec![object_var("car")],
            sugar::is_class("car", 1).unwrap(),
        )
        .unwrap();
        let formula = eventually(body).unwrap();
        let err = OnlineMonitor::new(formula, 30.0).unwrap_err();
        assert!(matches!(err, MonitorError::NotMonitorable { .. }));
    }

    #[test]
    fn out_of_order_frame_is_terminal() {
        let mut m = OnlineMonitor::new(const_bool(true), 30.0).unwrap();
        assert!(m.evaluate(empty_frame(5)).is_ok());
        let err = m.evaluate(empty_frame(3)).unwrap_err();
        assert!(matches!(err, MonitorError::OutOfOrderFrame { got: 3, last: 5 }));
        assert_eq!(m.state(), MonitorState::Error);
        let err2 = m.evaluate(empty_frame(10)).unwrap_err();
        assert!(matches!(err2, MonitorError::OutOfOrderFrame { got: 3, last: 5 }));
    }

    #[test]
    fn equal_frame_num_is_out_of_order() {
        let mut m = OnlineMonitor::new(const_bool(true), 30.0).unwrap();
        assert!(m.evaluate(empty_frame(0)).is_ok());
        assert!(m.evaluate(empty_frame(0)).is_err());
    }
}
