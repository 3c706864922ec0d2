use std::fmt;

/// Number of frames a requirement spans: either a known finite count or
/// the `UNBOUNDED` sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Bound {
    Finite(u64),
    Unbounded,
}

/// Public sentinel: any requirement at or above this many frames is
/// reported as [`Bound::Unbounded`] rather than as a literal (possibly
/// huge) finite count.
pub const UNBOUNDED: u64 = 1_000_000;

impl Bound {
    pub fn finite(n: u64) -> Self {
        if n >= UNBOUNDED {
            Bound::Unbounded
        } else {
            Bound::Finite(n)
        }
    }

    pub fn as_u64(self) -> Option<u64> {
        match self {
            Bound::Finite(n) => Some(n),
            Bound::Unbounded => None,
        }
    }

    pub fn is_unbounded(self) -> bool {
        matches!(self, Bound::Unbounded)
    }

    /// Saturating addition: `Unbounded + anything = Unbounded`.
    pub fn saturating_add(self, other: Bound) -> Bound {
        match (self, other) {
            (Bound::Unbounded, _) | (_, Bound::Unbounded) => Bound::Unbounded,
            (Bound::Finite(a), Bound::Finite(b)) => Bound::finite(a.saturating_add(b)),
        }
    }

    /// Saturating addition of a plain frame count, e.g. a `Next`/`Previous` step count.
    pub fn saturating_add_u64(self, k: u64) -> Bound {
        self.saturating_add(Bound::finite(k))
    }

    pub fn max(self, other: Bound) -> Bound {
        match (self, other) {
            (Bound::Unbounded, _) | (_, Bound::Unbounded) => Bound::Unbounded,
            (Bound::Finite(a), Bound::Finite(b)) => Bound::Finite(a.max(b)),
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Finite(n) => write!(f, "{n}"),
            Bound::Unbounded => write!(f, "UNBOUNDED"),
        }
    }
}

/// History/horizon pair computed for a formula, both in frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirements {
    pub history: Bound,
    pub horizon: Bound,
}

impl Requirements {
    pub const ZERO: Requirements = Requirements {
        history: Bound::Finite(0),
        horizon: Bound::Finite(0),
    };

    pub fn max(self, other: Requirements) -> Requirements {
        Requirements {
            history: self.history.max(other.history),
            horizon: self.horizon.max(other.horizon),
        }
    }
}
