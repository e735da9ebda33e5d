//! Epoch tag marking a soft-fork boundary for an account's chain.

use serde::{Deserialize, Serialize};

/// Which epoch an account's chain currently belongs to.
///
/// An account is promoted from `V0` to `V1` either by its own epoch block or
/// by receiving from a `V1` pending entry; it never regresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum Epoch {
    #[default]
    V0,
    V1,
}

impl Epoch {
    pub fn max(self, other: Self) -> Self {
        std::cmp::max(self, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v1_dominates_v0() {
        assert_eq!(Epoch::V0.max(Epoch::V1), Epoch::V1);
        assert_eq!(Epoch::V1.max(Epoch::V0), Epoch::V1);
    }

    #[test]
    fn default_is_v0() {
        assert_eq!(Epoch::default(), Epoch::V0);
    }
}
