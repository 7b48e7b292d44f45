//! Fixed-length sliding mean with O(1) incremental updates.
//!
//! The flank detector retro-corrects implausible samples after the fact, so
//! besides `push` the averager supports replacing the most recently pushed
//! value without touching older slots.

/// Sliding mean over the last `len` samples. Capacity is fixed at
/// construction; no growth, no reallocation after `new`.
#[derive(Debug, Clone)]
pub struct MovingAverager {
    slots: Box<[f64]>,
    mean: f64,
}

impl MovingAverager {
    /// Create an averager of `length` slots, all holding `init_value`.
    /// A requested length of 0 is clamped to 1.
    #[must_use]
    pub fn new(length: usize, init_value: f64) -> Self {
        let mut a = Self {
            slots: vec![0.0; length.max(1)].into_boxed_slice(),
            mean: 0.0,
        };
        a.reset(init_value);
        a
    }

    /// Shift in `value` at slot 0, dropping the oldest sample. The running
    /// mean is updated incrementally from the evicted slot.
    pub fn push(&mut self, value: f64) {
        let n = self.slots.len();
        self.mean += (value - self.slots[n - 1]) / n as f64;
        for i in (1..n).rev() {
            self.slots[i] = self.slots[i - 1];
        }
        self.slots[0] = value;
    }

    /// Overwrite the most recently pushed value. Used to reject a sample
    /// that turned out implausible after it was already averaged in.
    pub fn replace_last(&mut self, value: f64) {
        let n = self.slots.len() as f64;
        self.mean += (value - self.slots[0]) / n;
        self.slots[0] = value;
    }

    #[must_use]
    pub fn average(&self) -> f64 {
        self.mean
    }

    /// Set every slot to `init_value` and the mean along with it. Also bounds
    /// any accumulated float drift of the incremental mean.
    pub fn reset(&mut self, init_value: f64) {
        self.slots.fill(init_value);
        self.mean = init_value;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::MovingAverager;

    fn exact_mean(a: &MovingAverager, fed: &[f64], init: f64) -> f64 {
        let n = a.len();
        let mut window: Vec<f64> = vec![init; n];
        for &v in fed {
            window.rotate_right(1);
            window[0] = v;
        }
        window.iter().sum::<f64>() / n as f64
    }

    #[test]
    fn incremental_mean_tracks_exact_mean() {
        let mut a = MovingAverager::new(4, 0.5);
        let fed = [0.02, 0.018, 0.021, 0.3, 0.019, 0.02, 0.022];
        for (i, &v) in fed.iter().enumerate() {
            a.push(v);
            let exact = exact_mean(&a, &fed[..=i], 0.5);
            assert!(
                (a.average() - exact).abs() < 1e-12,
                "after sample {i}: incremental {} vs exact {exact}",
                a.average()
            );
        }
    }

    #[test]
    fn replace_last_matches_pushing_the_replacement() {
        let mut replaced = MovingAverager::new(3, 0.1);
        replaced.push(0.2);
        replaced.push(0.9);
        replaced.replace_last(0.3);

        let mut direct = MovingAverager::new(3, 0.1);
        direct.push(0.2);
        direct.push(0.3);

        assert!((replaced.average() - direct.average()).abs() < 1e-12);
    }

    #[test]
    fn reset_restores_a_uniform_window() {
        let mut a = MovingAverager::new(5, 0.0);
        for v in [1.0, 2.0, 3.0] {
            a.push(v);
        }
        a.reset(0.25);
        assert!((a.average() - 0.25).abs() < 1e-15);
        a.push(0.25);
        assert!((a.average() - 0.25).abs() < 1e-15);
    }

    #[test]
    fn zero_length_request_is_clamped_to_one() {
        let mut a = MovingAverager::new(0, 0.0);
        assert_eq!(a.len(), 1);
        a.push(7.0);
        assert!((a.average() - 7.0).abs() < 1e-15);
    }
}
