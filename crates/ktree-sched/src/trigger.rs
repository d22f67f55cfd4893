//! Trigger sources driving the scheduling loop.
//!
//! A trigger is the external event that starts one dispatch cycle — a
//! simulated interrupt in the reference deployment. The source is
//! injected so tests can supply deterministic selector sequences instead
//! of ad-hoc randomness.

use std::collections::VecDeque;

/// Yields the next trigger selector, or `None` when the source is drained.
pub trait TriggerSource {
    /// Next selector value to dispatch.
    fn next_trigger(&mut self) -> Option<u32>;
}

/// Deterministic scripted trigger sequence.
#[derive(Debug)]
pub struct SequenceTrigger {
    queue: VecDeque<u32>,
}

impl SequenceTrigger {
    /// Build a source that yields `selectors` in order, then drains.
    #[must_use]
    pub fn new(selectors: impl IntoIterator<Item = u32>) -> Self {
        Self { queue: selectors.into_iter().collect() }
    }

    /// Selectors not yet yielded.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl TriggerSource for SequenceTrigger {
    fn next_trigger(&mut self) -> Option<u32> {
        self.queue.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yields_in_order_then_drains() {
        let mut src = SequenceTrigger::new([2, 4, 1]);
        assert_eq!(src.remaining(), 3);
        assert_eq!(src.next_trigger(), Some(2));
        assert_eq!(src.next_trigger(), Some(4));
        assert_eq!(src.next_trigger(), Some(1));
        assert_eq!(src.next_trigger(), None);
    }
}
