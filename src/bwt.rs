//! Burrows-Wheeler Transform derivation from a suffix array.

/// Derives the BWT of `mapped` (length `n+1`, `mapped[n]` the sentinel)
/// given its suffix array `sa`: `bwt[i] = mapped[(sa[i] - 1) mod (n+1)]`.
/// `bwt` is a permutation of `mapped`.
pub fn derive_bwt(mapped: &[u16], sa: &[usize]) -> Vec<u16> {
    let n1 = mapped.len();
    debug_assert_eq!(sa.len(), n1);
    sa.iter()
        .map(|&s| {
            let prev = (s + n1 - 1) % n1;
            mapped[prev]
        })
        .collect()
}
