/// Outcome of `HistoryStack::move_to`: the result of jumping the cursor to
/// an explicit index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a, T> {
    /// The cursor moved and a snapshot lives at the index.
    Found(&'a T),
    /// The cursor moved, but the index is past the stored snapshots.
    Empty,
    /// The index is not below the capacity; the cursor did not move.
    OutOfRange,
}

impl<'a, T> Lookup<'a, T> {
    /// Sentinel string that older saved data used in place of `OutOfRange`.
    pub const OUT_OF_RANGE_MARKER: &'static str = "out-of-rang";

    /// The snapshot, if one was found.
    pub fn found(self) -> Option<&'a T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::Empty | Lookup::OutOfRange => None,
        }
    }

    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Lookup::OutOfRange)
    }

    /// Whether the cursor was moved by the lookup.
    pub fn moved(&self) -> bool {
        !self.is_out_of_range()
    }
}
