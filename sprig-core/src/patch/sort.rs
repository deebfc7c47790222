//! Keyed-list repositioning.
//!
//! A `Sort` walks the next list backward, keeping the host node of the item
//! it handled last as the insertion point. Added items are always built and
//! inserted there. Matched items are moved only when the strategy says so.
//!
//! # The minimal strategy
//!
//! A host move is assumed to cost more than leaving a node alone, so a
//! matched item stays put when its shift in position is fully explained by
//! insertions and removals around it. For an item moving from `old` to
//! `new`:
//!
//! - it is repositioned if it is now last and was not last before, or
//! - it is not last, moved forward (`new - old > 0`), and that shift differs
//!   from `additions_remaining - removals_before`.
//!
//! This is a heuristic. It is exact for edits that keep the survivors'
//! relative order, and for rotations, but some permutations (reversing a
//! list of three, for one) leave the host out of order. `MoveAll` always
//! produces the exact order at the cost of one host move per matched item.

use serde::{Deserialize, Serialize};

/// How matched keylist items are repositioned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortStrategy {
    /// Move only items whose shift is not explained by insertions/removals.
    #[default]
    Minimal,

    /// Re-insert every matched item in next order.
    MoveAll,
}

/// What the sort knows about one matched item when it reaches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemMove {
    /// Index in the prev list.
    pub old_index: usize,
    /// Index in the next list.
    pub new_index: usize,
    /// Length of the prev list.
    pub prev_len: usize,
    /// Length of the next list.
    pub next_len: usize,
    /// Additions not yet built (they all sit before this item).
    pub additions_remaining: usize,
    /// Removed prev items that sat before `old_index`.
    pub removals_before: usize,
}

impl ItemMove {
    fn is_last(&self) -> bool {
        self.new_index + 1 == self.next_len
    }

    fn moved_to_last(&self) -> bool {
        self.is_last() && self.old_index + 1 != self.prev_len
    }

    fn unexplained_forward_shift(&self) -> bool {
        let delta = self.new_index as isize - self.old_index as isize;
        let explained = self.additions_remaining as isize - self.removals_before as isize;
        !self.is_last() && delta > 0 && delta != explained
    }
}

impl SortStrategy {
    /// Whether the matched item must be re-inserted into the host.
    pub fn needs_reposition(self, item: &ItemMove) -> bool {
        match self {
            SortStrategy::MoveAll => true,
            SortStrategy::Minimal => item.moved_to_last() || item.unexplained_forward_shift(),
        }
    }
}
