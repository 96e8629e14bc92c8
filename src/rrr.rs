//! RRR-style compressed bit-vector: O(1) rank on 0s and 1s, O(1) access.
//!
//! The name is a nod to Raman, Raman & Rao's succinct rank/select structure;
//! their entropy-coded block layer is treated as an optional refinement
//! here — this implementation keeps the raw bits plus a single level of
//! popcount samples, which already gives O(1) rank/access.

use crate::bitops::low_mask;
use crate::error::Error;
use crate::heap_size::HeapSize;
use crate::packed_fixed::PackedFixedIntVec;

/// A bit-vector of length `N` with O(1) `rank0`/`rank1`/`access`, built from
/// popcount samples taken every `sample_period` bits.
#[derive(Clone, Debug)]
pub struct RrrBitVec {
    raw: Vec<u64>,
    len: usize,
    sample_period: usize,
    samples1: PackedFixedIntVec,
    total_ones: u64,
}

impl HeapSize for RrrBitVec {
    fn heap_size(&self) -> usize {
        self.raw.capacity() * std::mem::size_of::<u64>() + self.samples1.heap_size()
    }
}

impl RrrBitVec {
    /// Builds an `RrrBitVec` from a raw bit sequence (as packed 64-bit
    /// words, `len` meaningful bits) and a sample period.
    pub fn from_words(raw: Vec<u64>, len: usize, sample_period: usize) -> Self {
        assert!(sample_period > 0, "sample period must be positive");
        let num_samples = len / sample_period + 1;
        let total_ones = popcount_words(&raw, 0, len);
        let width = crate::bitops::min_bits(total_ones).max(crate::bitops::min_bits(len as u64));

        // samples1[k] = popcount(raw[0 .. k*sample_period)); every boundary
        // k*sample_period is <= len by construction of num_samples.
        let mut samples1 = PackedFixedIntVec::new(num_samples, width);
        let mut running = 0u64;
        let mut prev_boundary = 0usize;
        for k in 0..num_samples {
            let boundary = k * sample_period;
            running += popcount_words(&raw, prev_boundary, boundary);
            samples1.set(k, running);
            prev_boundary = boundary;
        }

        RrrBitVec {
            raw,
            len,
            sample_period,
            samples1,
            total_ones,
        }
    }

    /// Builds an `RrrBitVec` from a plain `bool` slice.
    pub fn from_bits(bits: &[bool], sample_period: usize) -> Self {
        let mut raw = vec![0u64; bits.len().div_ceil(64)];
        for (i, &b) in bits.iter().enumerate() {
            if b {
                raw[i / 64] |= 1u64 << (i % 64);
            }
        }
        Self::from_words(raw, bits.len(), sample_period)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn sample_period(&self) -> usize {
        self.sample_period
    }

    pub fn raw_words(&self) -> &[u64] {
        &self.raw
    }

    pub fn samples1(&self) -> &PackedFixedIntVec {
        &self.samples1
    }

    /// Bit `i` of the vector. Fails with `Query::OutOfRange` outside
    /// `[0, N)`.
    pub fn access(&self, i: i64) -> Result<bool, Error> {
        if i < 0 || i as usize >= self.len {
            return Err(Error::QueryOutOfRange {
                pos: i,
                len: self.len,
            });
        }
        let i = i as usize;
        Ok((self.raw[i / 64] >> (i % 64)) & 1 == 1)
    }

    /// Number of 1-bits strictly before `pos`. Clamped: `pos <= 0` yields
    /// `0`, `pos >= N` yields the total popcount.
    pub fn rank1(&self, pos: i64) -> u64 {
        if pos <= 0 {
            return 0;
        }
        if pos as u64 >= self.len as u64 {
            return self.total_ones;
        }
        let pos = pos as usize;
        let sample_idx = pos / self.sample_period;
        let boundary = sample_idx * self.sample_period;
        let base = self.samples1.get(sample_idx, self.samples1.width());
        base + popcount_words(&self.raw, boundary, pos)
    }

    /// `clamp(pos, 0, N) - rank1(pos)`.
    pub fn rank0(&self, pos: i64) -> u64 {
        let clamped = pos.clamp(0, self.len as i64) as u64;
        clamped - self.rank1(pos)
    }
}

/// Popcount of `raw`'s bits in `[from, to)`, broadword-style: full words in
/// the middle, masked partial words at the edges.
fn popcount_words(raw: &[u64], from: usize, to: usize) -> u64 {
    if from >= to {
        return 0;
    }
    let first_word = from / 64;
    let last_word = (to - 1) / 64;

    if first_word == last_word {
        let lo = (from % 64) as u32;
        let hi = (to - first_word * 64) as u32;
        let mask = low_mask(hi) & !low_mask(lo);
        return (raw.get(first_word).copied().unwrap_or(0) & mask).count_ones() as u64;
    }

    let mut total = 0u64;
    let lo = (from % 64) as u32;
    let first_mask = !low_mask(lo);
    total += (raw.get(first_word).copied().unwrap_or(0) & first_mask).count_ones() as u64;

    for w in raw.iter().take(last_word).skip(first_word + 1) {
        total += w.count_ones() as u64;
    }

    let hi = (to - last_word * 64) as u32;
    let last_mask = low_mask(hi);
    total += (raw.get(last_word).copied().unwrap_or(0) & last_mask).count_ones() as u64;

    total
}
