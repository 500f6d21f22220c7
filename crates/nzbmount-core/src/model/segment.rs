//! Per-part segment state vector with incrementally maintained counters.

use crate::engine::SegmentState;

/// Fixed-length vector of segment states plus aggregate counters.
///
/// The counters are maintained on every transition instead of being
/// recomputed; `MissingSegment` and `DownloadFailed` share the `missing`
/// bucket but stay distinct per segment.
#[derive(Debug, Clone)]
pub struct SegmentVector {
    states: Vec<SegmentState>,
    loading: usize,
    cached: usize,
    missing: usize,
}

impl SegmentVector {
    /// New vector of `count` segments, all `Unset`.
    pub fn new(count: usize) -> Self {
        Self {
            states: vec![SegmentState::Unset; count],
            loading: 0,
            cached: 0,
            missing: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn states(&self) -> &[SegmentState] {
        &self.states
    }

    /// Segments currently being fetched.
    pub fn loading(&self) -> usize {
        self.loading
    }

    /// Segments with data in the cache.
    pub fn cached(&self) -> usize {
        self.cached
    }

    /// Segments missing or failed.
    pub fn missing(&self) -> usize {
        self.missing
    }

    /// Apply a state transition. An out-of-range index is ignored; the engine
    /// is trusted but not assumed infallible.
    pub fn set(&mut self, index: usize, state: SegmentState) {
        let Some(slot) = self.states.get_mut(index) else {
            return;
        };
        let old = *slot;
        *slot = state;
        self.bump(old, -1);
        self.bump(state, 1);
    }

    fn bump(&mut self, state: SegmentState, delta: isize) {
        let counter = match state {
            SegmentState::Unset => return,
            SegmentState::Loading => &mut self.loading,
            SegmentState::HasData => &mut self.cached,
            SegmentState::MissingSegment | SegmentState::DownloadFailed => &mut self.missing,
        };
        *counter = counter.wrapping_add_signed(delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SegmentState::*;

    fn recount(v: &SegmentVector) -> (usize, usize, usize) {
        let mut loading = 0;
        let mut cached = 0;
        let mut missing = 0;
        for s in v.states() {
            match s {
                Unset => {}
                Loading => loading += 1,
                HasData => cached += 1,
                MissingSegment | DownloadFailed => missing += 1,
            }
        }
        (loading, cached, missing)
    }

    #[test]
    fn transitions_move_counters() {
        let mut v = SegmentVector::new(4);
        v.set(0, Loading);
        assert_eq!((v.loading(), v.cached(), v.missing()), (1, 0, 0));
        v.set(0, HasData);
        assert_eq!((v.loading(), v.cached(), v.missing()), (0, 1, 0));
        v.set(1, MissingSegment);
        v.set(2, DownloadFailed);
        assert_eq!((v.loading(), v.cached(), v.missing()), (0, 1, 2));
    }

    #[test]
    fn out_of_range_is_ignored() {
        let mut v = SegmentVector::new(2);
        v.set(2, HasData);
        v.set(usize::MAX, Loading);
        assert_eq!((v.loading(), v.cached(), v.missing()), (0, 0, 0));
        assert_eq!(v.states(), &[Unset, Unset]);
    }

    #[test]
    fn repeated_transition_is_counter_neutral() {
        let mut v = SegmentVector::new(3);
        v.set(1, HasData);
        let before = (v.loading(), v.cached(), v.missing());
        v.set(1, HasData);
        assert_eq!((v.loading(), v.cached(), v.missing()), before);
    }

    #[test]
    fn counters_match_recount_over_random_transitions() {
        // Deterministic LCG so the sequence is reproducible.
        let mut seed: u64 = 0x243f_6a88_85a3_08d3;
        let mut next = || {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (seed >> 33) as usize
        };
        let states = [Unset, Loading, HasData, MissingSegment, DownloadFailed];

        let mut v = SegmentVector::new(16);
        for _ in 0..1000 {
            // Indices occasionally out of range on purpose.
            let index = next() % 20;
            let state = states[next() % states.len()];
            v.set(index, state);
            let (loading, cached, missing) = recount(&v);
            assert_eq!(v.loading(), loading);
            assert_eq!(v.cached(), cached);
            assert_eq!(v.missing(), missing);
        }
    }
}
