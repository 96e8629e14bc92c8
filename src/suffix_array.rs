//! Suffix-array construction.
//!
//! A production index would lean on a published SA-IS/divsufsort
//! implementation behind a `build(mapped, sigma) -> SA` interface, but no
//! third-party crate in this workspace's dependency graph builds a suffix
//! array over an arbitrary `u16` alphabet of up to 32,768 symbols (the
//! available options are byte-oriented), so this module provides a small,
//! self-contained prefix-doubling construction standing in for that
//! external collaborator. It is O(n log^2 n), adequate for the text sizes
//! this crate is exercised against; swapping in a linear-time SA-IS is a
//! drop-in replacement behind this same function.

/// Builds the suffix array of `mapped`, an integer sequence whose smallest
/// value (conventionally the sentinel `0`) is unique and sorts first.
/// Returns a permutation `SA` of `0..mapped.len()` such that
/// `mapped[SA[i]..]` is non-decreasing in `i`.
pub fn build_suffix_array(mapped: &[u16]) -> Vec<usize> {
    let n = mapped.len();
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![0];
    }

    let mut sa: Vec<usize> = (0..n).collect();
    let mut rank: Vec<i64> = mapped.iter().map(|&c| c as i64).collect();
    let mut tmp: Vec<i64> = vec![0; n];
    let mut k = 1usize;

    loop {
        let key = |i: usize| -> (i64, i64) {
            let second = if i + k < n { rank[i + k] } else { -1 };
            (rank[i], second)
        };
        sa.sort_unstable_by(|&a, &b| key(a).cmp(&key(b)));

        tmp[sa[0]] = 0;
        for i in 1..n {
            let bump = if key(sa[i - 1]) < key(sa[i]) { 1 } else { 0 };
            tmp[sa[i]] = tmp[sa[i - 1]] + bump;
        }
        rank.copy_from_slice(&tmp);

        if rank[sa[n - 1]] as usize == n - 1 {
            break;
        }
        if k > n {
            break;
        }
        k *= 2;
    }

    sa
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn naive_suffix_array(mapped: &[u16]) -> Vec<usize> {
        let n = mapped.len();
        let mut sa: Vec<usize> = (0..n).collect();
        sa.sort_by_key(|&i| &mapped[i..]);
        sa
    }

    #[test]
    fn matches_naive_on_banana() {
        // "BANANA\0" mapped monotonically: \0=0 A=1 B=2 N=3.
        let mapped: Vec<u16> = vec![2, 1, 3, 1, 3, 1, 0];
        assert_eq!(build_suffix_array(&mapped), naive_suffix_array(&mapped));
    }

    #[test]
    fn matches_naive_on_random_small_alphabet() {
        let mut rng: StdRng = SeedableRng::seed_from_u64(0x9e37_79b9);
        for trial in 0..20 {
            let len = 3 + (trial % 40);
            let mut text: Vec<u16> = (0..len).map(|_| rng.gen_range(1..=5u16)).collect();
            text.push(0);
            assert_eq!(build_suffix_array(&text), naive_suffix_array(&text), "trial={trial}");
        }
    }

    #[test]
    fn single_sentinel_sequence() {
        assert_eq!(build_suffix_array(&[0]), vec![0]);
    }
}
