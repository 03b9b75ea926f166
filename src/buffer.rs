//! ==============================================================================
//! buffer.rs - fixed-capacity series of recent samples
//! ==============================================================================
//!
//! the chart only ever shows the newest `capacity` samples. pushing past
//! capacity drops from the front, so the oldest sample always goes first.
//!
//! ==============================================================================

use std::collections::VecDeque;

use crate::domain::Sample;

/// default number of points kept for the chart
pub const DEFAULT_CAPACITY: usize = 100;

/// axis extent used when there is nothing to scale against
pub const EMPTY_RANGE: [f64; 2] = [0.0, 1.0];

/// Rolling buffer of the most recent samples.
#[derive(Clone, Debug)]
pub struct SeriesBuffer {
    samples: VecDeque<Sample>,
    capacity: usize,
}

impl Default for SeriesBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl SeriesBuffer {
    /// capacity is clamped to at least one sample
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// append and trim from the front back down to capacity
    pub fn push(&mut self, sample: Sample) {
        self.samples.push_back(sample);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> + '_ {
        self.samples.iter()
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    pub fn timestamps(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.timestamp).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.value).collect()
    }

    /// [min, max] over timestamps, or [0, 1] when empty
    pub fn x_range(&self) -> [f64; 2] {
        extent(self.samples.iter().map(|s| s.timestamp))
    }

    /// [min, max] over values, or [0, 1] when empty
    pub fn y_range(&self) -> [f64; 2] {
        extent(self.samples.iter().map(|s| s.value))
    }
}

fn extent(points: impl Iterator<Item = f64>) -> [f64; 2] {
    points
        .fold(None, |acc: Option<[f64; 2]>, p| match acc {
            None => Some([p, p]),
            Some([lo, hi]) => Some([lo.min(p), hi.max(p)]),
        })
        .unwrap_or(EMPTY_RANGE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample(i: usize) -> Sample {
        Sample::new(i as f64, i as f64 * 10.0)
    }

    #[test]
    fn empty_buffer_ranges_default_to_unit() {
        let buffer = SeriesBuffer::default();
        assert!(buffer.is_empty());
        assert_eq!(buffer.x_range(), [0.0, 1.0]);
        assert_eq!(buffer.y_range(), [0.0, 1.0]);
    }

    #[test]
    fn ranges_cover_min_and_max() {
        let mut buffer = SeriesBuffer::default();
        buffer.push(Sample::new(5.0, -2.0));
        buffer.push(Sample::new(3.0, 7.5));
        buffer.push(Sample::new(9.0, 1.0));
        assert_eq!(buffer.x_range(), [3.0, 9.0]);
        assert_eq!(buffer.y_range(), [-2.0, 7.5]);
    }

    #[test]
    fn single_sample_range_is_degenerate() {
        let mut buffer = SeriesBuffer::default();
        buffer.push(Sample::new(42.0, 3.0));
        assert_eq!(buffer.x_range(), [42.0, 42.0]);
        assert_eq!(buffer.y_range(), [3.0, 3.0]);
    }

    #[test]
    fn trims_to_one_hundred_by_default() {
        let mut buffer = SeriesBuffer::default();
        for i in 0..150 {
            buffer.push(sample(i));
        }
        assert_eq!(buffer.len(), 100);
        assert_eq!(buffer.iter().next(), Some(&sample(50)));
        assert_eq!(buffer.latest(), Some(&sample(149)));
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut buffer = SeriesBuffer::with_capacity(0);
        buffer.push(sample(1));
        buffer.push(sample(2));
        assert_eq!(buffer.capacity(), 1);
        assert_eq!(buffer.values(), vec![20.0]);
    }

    proptest! {
        #[test]
        fn never_exceeds_capacity_and_keeps_newest(
            capacity in 1usize..=120,
            count in 0usize..400,
        ) {
            let mut buffer = SeriesBuffer::with_capacity(capacity);
            for i in 0..count {
                buffer.push(sample(i));
                prop_assert!(buffer.len() <= capacity);
            }

            let expected: Vec<f64> = (count.saturating_sub(capacity)..count)
                .map(|i| i as f64)
                .collect();
            prop_assert_eq!(buffer.timestamps(), expected);
        }
    }
}
