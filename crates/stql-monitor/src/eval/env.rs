use std::collections::HashMap;

/// Evaluation context threaded through the recursive evaluator.
///
/// `tick` is the logical position (window-relative) of the frame the
/// expression currently being evaluated should treat as "now" — it shifts
/// under `Next`/`Previous`/`Until`/`Since` recursion. `object_bindings`
/// and the two freeze-binding maps only ever grow as evaluation descends
/// into quantifier/freeze bodies.
#[derive(Debug, Clone)]
pub struct Env {
    pub tick: u64,
    pub object_bindings: HashMap<String, String>,
    pub time_bindings: HashMap<String, f64>,
    pub frame_bindings: HashMap<String, i64>,
}

impl Env {
    pub fn at_tick(tick: u64) -> Self {
        Self {
            tick,
            object_bindings: HashMap::new(),
            time_bindings: HashMap::new(),
            frame_bindings: HashMap::new(),
        }
    }

    pub fn with_tick(&self, tick: u64) -> Self {
        Self {
            tick,
            ..self.clone()
        }
    }

    pub fn with_object_binding(&self, name: &str, object_id: &str) -> Self {
        let mut next = self.clone();
        next.object_bindings
            .insert(name.to_string(), object_id.to_string());
        next
    }
}
