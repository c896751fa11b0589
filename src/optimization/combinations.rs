//! k-combination enumeration and search-space counting

/// C(n, k) with overflow detection. `None` when the value does not fit in `u64`.
pub fn binomial(n: usize, k: usize) -> Option<u64> {
    if k > n {
        return Some(0);
    }
    let k = k.min(n - k);
    let mut acc: u128 = 1;
    for i in 0..k {
        // acc * (n - i) is always divisible by (i + 1) here
        acc = acc.checked_mul((n - i) as u128)? / (i as u128 + 1);
    }
    u64::try_from(acc).ok()
}

/// Σ C(n, k) for k = 1..=max_k (max_k clamped to n).
pub fn subset_count(n: usize, max_k: usize) -> Option<u64> {
    (1..=max_k.min(n)).try_fold(0u64, |total, k| total.checked_add(binomial(n, k)?))
}

/// Lexicographic enumeration of the k-element index subsets of `0..n`.
///
/// Not an `Iterator`: each combination is lent out as a slice into an
/// internal buffer, so enumeration allocates once.
#[derive(Debug, Clone)]
pub struct Combinations {
    n: usize,
    indices: Vec<usize>,
    started: bool,
    exhausted: bool,
}

impl Combinations {
    pub fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            indices: (0..k).collect(),
            started: false,
            exhausted: k == 0 || k > n,
        }
    }

    /// Advance to the next combination.
    pub fn next_combination(&mut self) -> Option<&[usize]> {
        if self.exhausted {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(&self.indices);
        }

        let k = self.indices.len();
        // Rightmost position that has not reached its maximum (n - k + i)
        let pivot = (0..k).rev().find(|&i| self.indices[i] < self.n - k + i);
        match pivot {
            Some(i) => {
                self.indices[i] += 1;
                for j in i + 1..k {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
                Some(&self.indices)
            }
            None => {
                self.exhausted = true;
                None
            }
        }
    }
}
