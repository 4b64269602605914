//! Sum tree for prioritized sampling.
use rand::Rng;
use segment_tree::{
    ops::{MaxIgnoreNaN, MinIgnoreNaN},
    SegmentPoint,
};
use serde::{Deserialize, Serialize};

/// Normalization of importance sampling weights.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
pub enum WeightNormalizer {
    /// Divides by the largest weight any stored transition could get, which
    /// belongs to the transition of the minimum priority.
    All,

    /// Divides by the largest weight in the sampled batch.
    Batch,
}

/// Array-backed complete binary tree over ring slots.
///
/// Leaf `i` is stored at `capacity - 1 + i` and holds `p_i^alpha`; every
/// internal node holds the sum of its two children. Raw priorities are kept
/// alongside for [`SumTree::max`] and [`SumTree::priority`].
#[derive(Debug)]
pub(super) struct SumTree {
    alpha: f32,
    capacity: usize,
    n_samples: usize,
    tree: Vec<f32>,
    priorities: Vec<f32>,
    min_tree: SegmentPoint<f32, MinIgnoreNaN>,
    max_tree: SegmentPoint<f32, MaxIgnoreNaN>,
    normalize: WeightNormalizer,
}

impl SumTree {
    pub fn new(capacity: usize, alpha: f32, normalize: WeightNormalizer) -> Self {
        debug_assert!(capacity > 0);
        Self {
            alpha,
            capacity,
            n_samples: 0,
            tree: vec![0f32; 2 * capacity - 1],
            priorities: vec![0f32; capacity],
            min_tree: SegmentPoint::build(vec![f32::MAX; capacity], MinIgnoreNaN),
            max_tree: SegmentPoint::build(vec![0f32; capacity], MaxIgnoreNaN),
            normalize,
        }
    }

    /// Sum of `p_i^alpha` over occupied slots.
    pub fn total(&self) -> f32 {
        self.tree[0]
    }

    /// Maximum raw priority, `None` if no slot is occupied.
    pub fn max(&self) -> Option<f32> {
        if self.n_samples == 0 {
            None
        } else {
            Some(self.max_tree.query(0, self.n_samples))
        }
    }

    /// Raw priority at `slot`.
    pub fn priority(&self, slot: usize) -> Option<f32> {
        if slot < self.n_samples {
            Some(self.priorities[slot])
        } else {
            None
        }
    }

    /// Sets the raw priority at `slot`.
    ///
    /// Slots are occupied in order, so `slot` is at most the number of
    /// occupied slots.
    pub fn set(&mut self, slot: usize, p: f32) {
        debug_assert!(slot <= self.n_samples && slot < self.capacity);

        let q = p.powf(self.alpha);
        self.priorities[slot] = p;
        self.min_tree.modify(slot, q);
        self.max_tree.modify(slot, p);

        let mut ix = slot + self.capacity - 1;
        self.tree[ix] = q;
        while ix > 0 {
            ix = (ix - 1) / 2;
            let left = 2 * ix + 1;
            self.tree[ix] = self.tree[left] + self.tree[left + 1];
        }

        if slot == self.n_samples {
            self.n_samples += 1;
        }
    }

    /// Slot whose cumulative range of `p^alpha` contains `s`.
    ///
    /// Never returns a slot of zero mass as long as the total is positive.
    pub fn get(&self, s: f32) -> usize {
        let mut ix = 0;
        let mut s = s;
        loop {
            let left = 2 * ix + 1;
            if left >= self.tree.len() {
                break;
            }
            let right = left + 1;
            if s < self.tree[left] || self.tree[right] <= 0.0 {
                ix = left;
            } else {
                s -= self.tree[left];
                ix = right;
            }
        }
        ix + 1 - self.capacity
    }

    /// Stratified sampling of `batch_size` slots with importance weights.
    ///
    /// The range `[0, total)` is split into `batch_size` segments of equal
    /// width and one slot is drawn from each. The weight of slot `i` is
    /// `(N P(i))^(-beta)`, normalized according to [`WeightNormalizer`].
    pub fn sample<R: Rng>(&self, batch_size: usize, beta: f32, rng: &mut R) -> (Vec<usize>, Vec<f32>) {
        let total = self.total();
        let segment = total / batch_size as f32;
        let slots = (0..batch_size)
            .map(|i| self.get(segment * (i as f32 + rng.gen::<f32>())))
            .collect::<Vec<_>>();

        let n = self.n_samples as f32;
        let ws = slots
            .iter()
            .map(|&slot| (n * self.tree[slot + self.capacity - 1] / total).powf(-beta))
            .collect::<Vec<_>>();

        let w_max = match self.normalize {
            WeightNormalizer::Batch => ws.iter().fold(f32::MIN, |m, &w| m.max(w)),
            WeightNormalizer::All => {
                let q_min = self.min_tree.query(0, self.n_samples);
                (n * q_min / total).powf(-beta)
            }
        };
        let ws = ws.iter().map(|w| (w / w_max).min(1.0)).collect();

        log::trace!("sampled slots {:?} with total mass {}", slots, total);

        (slots, ws)
    }
}

#[cfg(test)]
mod tests {
    use super::{SumTree, WeightNormalizer};
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_sum_tree_odd() {
        let data = vec![0.5f32, 0.2, 0.8, 0.3, 1.1, 2.5, 3.9];
        let mut sum_tree = SumTree::new(8, 1.0, WeightNormalizer::Batch);
        for (ix, &p) in data.iter().enumerate() {
            sum_tree.set(ix, p);
        }

        assert!((sum_tree.total() - data.iter().sum::<f32>()).abs() < 1e-5);
        assert_eq!(sum_tree.get(0.0), 0);
        assert_eq!(sum_tree.get(0.4), 0);
        assert_eq!(sum_tree.get(0.6), 1);
        assert_eq!(sum_tree.get(1.2), 2);
        assert_eq!(sum_tree.get(1.6), 3);
        assert_eq!(sum_tree.get(2.0), 4);
        assert_eq!(sum_tree.get(2.8), 4);
        // Beyond the total, the last occupied slot is returned.
        assert_eq!(sum_tree.get(100.0), 6);
        assert_eq!(sum_tree.max(), Some(3.9));
    }

    #[test]
    fn test_capacity_one() {
        let mut sum_tree = SumTree::new(1, 0.6, WeightNormalizer::All);
        assert_eq!(sum_tree.max(), None);
        sum_tree.set(0, 2.0);
        assert_eq!(sum_tree.get(0.3), 0);
        assert_eq!(sum_tree.priority(0), Some(2.0));
        sum_tree.set(0, 0.5);
        assert_eq!(sum_tree.max(), Some(0.5));

        let mut rng = StdRng::seed_from_u64(0);
        let (slots, ws) = sum_tree.sample(4, 0.4, &mut rng);
        assert_eq!(slots, vec![0; 4]);
        assert!(ws.iter().all(|&w| (w - 1.0).abs() < 1e-6));
    }

    #[test]
    fn test_weights_all_normalizer() {
        let mut sum_tree = SumTree::new(4, 1.0, WeightNormalizer::All);
        for (ix, &p) in [1.0f32, 2.0, 3.0, 4.0].iter().enumerate() {
            sum_tree.set(ix, p);
        }
        let mut rng = StdRng::seed_from_u64(1);
        let (slots, ws) = sum_tree.sample(64, 1.0, &mut rng);
        for (slot, w) in slots.iter().zip(ws.iter()) {
            // With beta = 1 the weight is p_min / p_i.
            assert!((w - 1.0 / (*slot as f32 + 1.0)).abs() < 1e-5);
        }
    }
}
