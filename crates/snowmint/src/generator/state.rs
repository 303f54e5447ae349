use core::cmp::Ordering;

/// Mutable generator state. Both fields change together, always under the
/// generator's lock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct State {
    /// Timestamp of the last minted ID; `None` until the first one.
    last_timestamp: Option<u64>,
    /// Sequence of the last minted ID.
    sequence: u64,
}

/// What the generator should do with a given clock reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Step {
    /// Mint an ID from these components.
    Mint { timestamp: u64, sequence: u64 },
    /// Every sequence value of the current millisecond is used up.
    Exhausted,
    /// The clock reads earlier than the last minted timestamp.
    Behind { last_timestamp: u64 },
}

impl State {
    pub(crate) const fn new() -> Self {
        Self {
            last_timestamp: None,
            sequence: 0,
        }
    }

    /// Decides the next step for `now` without changing anything.
    pub(crate) fn step(&self, now: u64, max_sequence: u64) -> Step {
        let Some(last_timestamp) = self.last_timestamp else {
            return Step::Mint {
                timestamp: now,
                sequence: 0,
            };
        };

        match now.cmp(&last_timestamp) {
            Ordering::Greater => Step::Mint {
                timestamp: now,
                sequence: 0,
            },
            Ordering::Equal if self.sequence < max_sequence => Step::Mint {
                timestamp: now,
                sequence: self.sequence + 1,
            },
            Ordering::Equal => Step::Exhausted,
            Ordering::Less => Step::Behind { last_timestamp },
        }
    }

    /// Records a minted ID.
    pub(crate) fn commit(&mut self, timestamp: u64, sequence: u64) {
        debug_assert!(
            self.last_timestamp
                .is_none_or(|last| (timestamp, sequence) > (last, self.sequence)),
            "state must only move forward"
        );
        self.last_timestamp = Some(timestamp);
        self.sequence = sequence;
    }

    #[cfg(test)]
    pub(crate) const fn last_timestamp(&self) -> Option<u64> {
        self.last_timestamp
    }
}
