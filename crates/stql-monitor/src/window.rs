use std::collections::VecDeque;

use stql_frames::Frame;
use tracing::trace;

/// The monitor's sliding window: the most recently pushed frames, indexed
/// by logical position (0-based, one per `push`, independent of the
/// frame's own `frame_num` field).
///
/// `capacity = None` means history is unbounded for this formula: the
/// window grows without bound rather than evicting (documented in
/// `DESIGN.md` as a non-O(1) footprint, opt-in by formula shape).
pub struct Window {
    frames: VecDeque<Frame>,
    capacity: Option<usize>,
    start_position: u64,
}

impl Window {
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            frames: VecDeque::new(),
            capacity,
            start_position: 0,
        }
    }

    pub fn push(&mut self, frame: Frame) {
        self.frames.push_back(frame);
        if let Some(cap) = self.capacity {
            while self.frames.len() > cap {
                self.frames.pop_front();
                self.start_position += 1;
                trace!(target: "monitor.window", start_position = self.start_position, "evicted oldest frame");
            }
        }
    }

    /// Position of the most recently pushed frame, or `None` if empty.
    pub fn last_position(&self) -> Option<u64> {
        if self.frames.is_empty() {
            None
        } else {
            Some(self.start_position + self.frames.len() as u64 - 1)
        }
    }

    pub fn first_position(&self) -> u64 {
        self.start_position
    }

    /// Frame retained at logical `position`, if still in the window.
    pub fn get(&self, position: u64) -> Option<&Frame> {
        if position < self.start_position {
            return None;
        }
        let idx = position - self.start_position;
        self.frames.get(idx as usize)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
