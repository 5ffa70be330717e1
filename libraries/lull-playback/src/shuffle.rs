//! Shuffle order generation
//!
//! The queue never reorders its tracks; shuffling produces a permutation of
//! positions that the queue walks instead.

use rand::seq::SliceRandom;
use rand::Rng;

/// Random permutation of `0..len` (Fisher-Yates)
pub fn shuffled_order<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    order.shuffle(rng);
    order
}

/// Check that `order` is a bijection over `0..order.len()`
pub fn is_permutation(order: &[usize]) -> bool {
    let mut seen = vec![false; order.len()];
    for &index in order {
        match seen.get_mut(index) {
            Some(slot) if !*slot => *slot = true,
            _ => return false,
        }
    }
    true
}
