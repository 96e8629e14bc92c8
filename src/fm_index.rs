//! The FM-Index shell: alphabet mapping, cumulative counts, sampled suffix
//! array / inverse-suffix-array vectors, backward search, locate and
//! extract.

use crate::alphabet::{Alphabet, Symbol, SENTINEL};
use crate::bitops::min_bits;
use crate::bwt::derive_bwt;
use crate::error::Error;
use crate::heap_size::HeapSize;
use crate::packed_fixed::PackedFixedIntVec;
use crate::rrr::RrrBitVec;
use crate::suffix_array::build_suffix_array;
use crate::wavelet::FbbWavelet;

/// A compressed full-text index supporting `count`, `locate` and `extract`
/// over an immutable text.
pub struct FmIndex {
    alphabet: Alphabet,
    n: usize,
    bwt: FbbWavelet,
    cumulative_counts: Vec<u64>,
    sampled_suffixes: PackedFixedIntVec,
    sampled_bitmap: RrrBitVec,
    positions: Option<PackedFixedIntVec>,
    sample_rate: u32,
    enable_extract: bool,
}

impl HeapSize for FmIndex {
    /// Approximate resident size in bytes: the sum of every backing
    /// structure's own heap usage.
    fn heap_size(&self) -> usize {
        self.alphabet.heap_size()
            + self.bwt.heap_size()
            + self.cumulative_counts.capacity() * std::mem::size_of::<u64>()
            + self.sampled_suffixes.heap_size()
            + self.sampled_bitmap.heap_size()
            + self.positions.as_ref().map(|p| p.heap_size()).unwrap_or(0)
    }
}

impl FmIndex {
    /// Builds an index over `text`. `sample_rate` trades index size for
    /// locate/extract speed; `enable_extract` controls whether the
    /// `positions` array needed by `extract*` is built at all.
    pub fn build(text: &[Symbol], sample_rate: u32, enable_extract: bool) -> Result<FmIndex, Error> {
        if text.is_empty() {
            return Err(Error::BuildEmptyInput);
        }
        if sample_rate == 0 {
            return Err(Error::BuildInvalidSampleRate { sample_rate });
        }
        let alphabet = Alphabet::build(text)?;
        let sigma = alphabet.sigma();
        log::debug!("fm_index: alphabet built, sigma={sigma}");

        let mapped = alphabet.map_and_terminate(text);
        let n = text.len();
        let n1 = mapped.len() as u64;

        let mut cumulative_counts = vec![0u64; sigma + 1];
        for &m in &mapped {
            cumulative_counts[m as usize + 1] += 1;
        }
        for c in 1..=sigma {
            cumulative_counts[c] += cumulative_counts[c - 1];
        }

        let sa = build_suffix_array(&mapped);
        log::debug!("fm_index: suffix array built, n+1={n1}");

        let bit_width_suffixes = min_bits(n1);
        let rate = sample_rate as u64;
        let num_samples = (n1 / rate + 1) as usize;
        let mut sampled_suffixes = PackedFixedIntVec::new(num_samples, bit_width_suffixes);
        let mut sampled_bits = vec![false; n1 as usize];
        let mut next_slot = 0usize;
        for (i, &sa_i) in sa.iter().enumerate() {
            if sa_i as u64 % rate == 0 {
                sampled_bits[i] = true;
                sampled_suffixes.set(next_slot, sa_i as u64);
                next_slot += 1;
            }
        }
        let sampled_bitmap = RrrBitVec::from_bits(&sampled_bits, rate as usize);

        let positions = if enable_extract {
            let plen = (n1 / rate + 2) as usize;
            let mut positions = PackedFixedIntVec::new(plen, bit_width_suffixes);
            for (i, &sa_i) in sa.iter().enumerate() {
                if sa_i as u64 % rate == 0 {
                    let slot = (sa_i as u64 / rate) as usize;
                    positions.set(slot, i as u64);
                }
            }
            let wrap_idx = ((n1 - 1) / rate + 1) as usize;
            let val0 = positions.get(0, bit_width_suffixes);
            positions.set(wrap_idx, val0);
            Some(positions)
        } else {
            None
        };

        let bwt_raw = derive_bwt(&mapped, &sa);
        drop(mapped);
        drop(sa);
        let bwt = FbbWavelet::build(&bwt_raw, sigma, rate as usize);
        drop(bwt_raw);
        log::debug!("fm_index: wavelet tree built over bwt");

        Ok(FmIndex {
            alphabet,
            n,
            bwt,
            cumulative_counts,
            sampled_suffixes,
            sampled_bitmap,
            positions,
            sample_rate,
            enable_extract,
        })
    }

    /// Reassembles an `FmIndex` from its serialized components, in
    /// [`crate::serializer`].
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        alphabet: Alphabet,
        n: usize,
        bwt: FbbWavelet,
        cumulative_counts: Vec<u64>,
        sampled_suffixes: PackedFixedIntVec,
        sampled_bitmap: RrrBitVec,
        positions: Option<PackedFixedIntVec>,
        sample_rate: u32,
        enable_extract: bool,
    ) -> FmIndex {
        FmIndex {
            alphabet,
            n,
            bwt,
            cumulative_counts,
            sampled_suffixes,
            sampled_bitmap,
            positions,
            sample_rate,
            enable_extract,
        }
    }

    pub(crate) fn alphabet_table(&self) -> &Alphabet {
        &self.alphabet
    }

    pub(crate) fn bwt_table(&self) -> &FbbWavelet {
        &self.bwt
    }

    pub(crate) fn cumulative_counts_table(&self) -> &[u64] {
        &self.cumulative_counts
    }

    pub(crate) fn sampled_suffixes_table(&self) -> &PackedFixedIntVec {
        &self.sampled_suffixes
    }

    pub(crate) fn sampled_bitmap_table(&self) -> &RrrBitVec {
        &self.sampled_bitmap
    }

    pub(crate) fn positions_table(&self) -> Option<&PackedFixedIntVec> {
        self.positions.as_ref()
    }

    pub(crate) fn sample_rate_value(&self) -> u32 {
        self.sample_rate
    }

    pub(crate) fn enable_extract_value(&self) -> bool {
        self.enable_extract
    }

    /// Length of the original (unmapped, un-terminated) text.
    pub fn input_length(&self) -> u64 {
        self.n as u64
    }

    /// Alphabet size, sentinel included.
    pub fn alphabet_size(&self) -> u32 {
        self.alphabet.sigma() as u32
    }

    /// Number of occurrences of `pattern` in the indexed text.
    pub fn count(&self, pattern: &[Symbol]) -> u64 {
        self.count_range(pattern, 0, pattern.len())
    }

    /// `count` over `pattern[offset .. offset+length]`.
    pub fn count_range(&self, pattern: &[Symbol], offset: usize, length: usize) -> u64 {
        match self.backward_search(&pattern[offset..offset + length]) {
            Some((lo, hi)) => hi.saturating_sub(lo),
            None => 0,
        }
    }

    /// Backward search: narrows the BWT interval right-to-left over
    /// `pattern`, returning `None` if a pattern symbol is not in the
    /// indexed alphabet.
    fn backward_search(&self, pattern: &[Symbol]) -> Option<(u64, u64)> {
        if pattern.is_empty() {
            return Some((0, self.bwt.len() as u64));
        }
        let mut i = pattern.len() - 1;
        let mut c = self.alphabet.mapped_id(pattern[i])?;
        let mut lo = self.cumulative_counts[c as usize];
        let mut hi = self.cumulative_counts[c as usize + 1];
        while lo < hi && i >= 1 {
            i -= 1;
            c = self.alphabet.mapped_id(pattern[i])?;
            lo = self.cumulative_counts[c as usize] + self.bwt.rank(lo as i64, c);
            hi = self.cumulative_counts[c as usize] + self.bwt.rank(hi as i64, c);
        }
        Some((lo, hi))
    }

    /// Writes up to `dest.len()` (or `max_matches`, whichever is smaller)
    /// occurrence offsets of `pattern[offset..offset+length]` into `dest`,
    /// in BWT-interval order (not sorted by text position). Returns the
    /// number of positions written.
    pub fn locate(&self, pattern: &[Symbol], offset: usize, length: usize, dest: &mut [u32], max_matches: i32) -> u32 {
        let (lo, hi) = match self.backward_search(&pattern[offset..offset + length]) {
            Some(x) => x,
            None => return 0,
        };
        let cap = if max_matches < 0 {
            dest.len()
        } else {
            dest.len().min(max_matches as usize)
        };

        let mut written = 0usize;
        let mut j = lo + 1;
        while j <= hi && written < cap {
            let mut k = j;
            let mut dist = 0u64;
            while !self.sampled_bitmap.access(k as i64 - 1).unwrap_or(false) {
                let (_, c) = self.bwt.inverse_select(k as i64 - 1);
                k = self.cumulative_counts[c as usize] + self.bwt.rank(k as i64, c);
                dist += 1;
            }
            let sample_idx = self.sampled_bitmap.rank1(k as i64) - 1;
            let sa_val = self.sampled_suffixes.get(sample_idx as usize, self.sampled_suffixes.width());
            dest[written] = (sa_val + dist) as u32;
            written += 1;
            j += 1;
        }
        written as u32
    }

    /// Text symbols in `[start, stop)`, written into `dest[dest_offset..]`.
    /// Requires the index was built with `enable_extract = true`.
    pub fn extract(&self, start: u64, stop: u64, dest: &mut [Symbol], dest_offset: usize) -> Result<u32, Error> {
        self.check_extract_enabled()?;
        let len = self.n as u64 + 1;
        if start > stop || stop >= len {
            return Err(Error::ExtractOutOfRange { start, stop, len });
        }
        let needed = (stop - start) as usize;
        if dest.len() - dest_offset < needed {
            return Err(Error::ExtractDestTooSmall {
                needed,
                available: dest.len() - dest_offset,
            });
        }
        let buf = self.decode_range(start, stop);
        dest[dest_offset..dest_offset + needed].copy_from_slice(&buf);
        Ok(needed as u32)
    }

    /// The maximal window `[from_left, from_right)` around `from` that
    /// contains no `boundary` symbol, written into `dest[dest_offset..]`.
    /// `boundary` itself is not written.
    pub fn extract_until_boundary(&self, from: u64, dest: &mut [Symbol], dest_offset: usize, boundary: Symbol) -> Result<u32, Error> {
        self.check_extract_enabled()?;
        self.alphabet.mapped_id(boundary).ok_or(Error::BoundaryNotInAlphabet)?;
        let left = self.scan_left(from, boundary);
        let right = self.scan_right(from, boundary);
        self.write_parts(&left, &right, dest, dest_offset)
    }

    /// Only `[from_left, from)`.
    pub fn extract_until_boundary_left(&self, from: u64, dest: &mut [Symbol], dest_offset: usize, boundary: Symbol) -> Result<u32, Error> {
        self.check_extract_enabled()?;
        self.alphabet.mapped_id(boundary).ok_or(Error::BoundaryNotInAlphabet)?;
        let left = self.scan_left(from, boundary);
        self.write_parts(&left, &[], dest, dest_offset)
    }

    /// Only `[from, from_right)`.
    pub fn extract_until_boundary_right(&self, from: u64, dest: &mut [Symbol], dest_offset: usize, boundary: Symbol) -> Result<u32, Error> {
        self.check_extract_enabled()?;
        self.alphabet.mapped_id(boundary).ok_or(Error::BoundaryNotInAlphabet)?;
        let right = self.scan_right(from, boundary);
        self.write_parts(&[], &right, dest, dest_offset)
    }

    fn write_parts(&self, left: &[Symbol], right: &[Symbol], dest: &mut [Symbol], dest_offset: usize) -> Result<u32, Error> {
        let total = left.len() + right.len();
        if dest.len() - dest_offset < total {
            return Err(Error::ExtractDestTooSmall {
                needed: total,
                available: dest.len() - dest_offset,
            });
        }
        dest[dest_offset..dest_offset + left.len()].copy_from_slice(left);
        dest[dest_offset + left.len()..dest_offset + total].copy_from_slice(right);
        Ok(total as u32)
    }

    fn check_extract_enabled(&self) -> Result<(), Error> {
        if self.enable_extract {
            Ok(())
        } else {
            Err(Error::ExtractNotEnabled)
        }
    }

    /// Seeds a backward LF-walk decode ending just before text position
    /// `stop`: returns `(sample_position, skip_until_next_sampled)`.
    fn seed_backward(&self, stop: u64) -> (u64, u64) {
        let positions = self.positions.as_ref().expect("enable_extract checked by caller");
        let width = positions.width();
        let rate = self.sample_rate as u64;
        let idx = (stop / rate) as usize + 1;
        let sample_position = positions.get(idx, width) + 1;
        let plen = positions.len();
        let mut skip = rate - (stop % rate);
        if (stop / rate) as usize == plen - 2 {
            skip = (self.n as u64 + 1) - stop;
        }
        (sample_position, skip)
    }

    /// One LF step of the backward decode. Returns the decoded symbol once
    /// `distance >= skip` (i.e. past the initial skip-until-sampled
    /// warm-up), else `None`.
    fn backward_step(&self, sample_position: &mut u64, distance: &mut u64, skip: u64) -> Option<Symbol> {
        let (_, c) = self.bwt.inverse_select(*sample_position as i64 - 1);
        *sample_position = self.cumulative_counts[c as usize] + self.bwt.rank(*sample_position as i64, c);
        let emitted = if *distance >= skip {
            Some(self.alphabet.original_symbol(c))
        } else {
            None
        };
        *distance += 1;
        emitted
    }

    /// Decodes `[start, stop)` via the backward LF-walk, in original
    /// left-to-right order.
    fn decode_range(&self, start: u64, stop: u64) -> Vec<Symbol> {
        let (mut sample_position, skip) = self.seed_backward(stop);
        let mut distance = 0u64;
        let total = (stop - start) as usize;
        let mut buf = vec![0 as Symbol; total];
        let mut remaining = total;
        while remaining > 0 {
            if let Some(sym) = self.backward_step(&mut sample_position, &mut distance, skip) {
                remaining -= 1;
                buf[remaining] = sym;
            }
        }
        buf
    }

    /// `[from_left, from)` in left-to-right order: decodes backward from
    /// `from`, stopping at `boundary` (excluded) or the start of the text.
    fn scan_left(&self, from: u64, boundary: Symbol) -> Vec<Symbol> {
        if from == 0 {
            return Vec::new();
        }
        let (mut sample_position, skip) = self.seed_backward(from);
        let mut distance = 0u64;
        let mut collected = Vec::new();
        while (collected.len() as u64) < from {
            match self.backward_step(&mut sample_position, &mut distance, skip) {
                Some(sym) if sym == boundary => break,
                Some(sym) => collected.push(sym),
                None => {}
            }
        }
        collected.reverse();
        collected
    }

    /// `[from, from_right)` in left-to-right order: decodes forward from
    /// `from` in batches of 4, each batch itself decoded via the backward
    /// LF-walk seeded at the batch's end.
    fn scan_right(&self, from: u64, boundary: Symbol) -> Vec<Symbol> {
        const BATCH: u64 = 4;
        let n = self.n as u64;
        let mut collected = Vec::new();
        let mut pos = from;
        while pos < n {
            let next = (pos + BATCH).min(n);
            let batch = self.decode_range(pos, next);
            match batch.iter().position(|&s| s == boundary) {
                Some(idx) => {
                    collected.extend_from_slice(&batch[..idx]);
                    return collected;
                }
                None => {
                    collected.extend_from_slice(&batch);
                    pos = next;
                }
            }
        }
        collected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbols(s: &str) -> Vec<Symbol> {
        s.chars().map(|c| c as u16).collect()
    }

    #[test]
    fn rejects_empty_input() {
        assert!(matches!(FmIndex::build(&[], 8, true), Err(Error::BuildEmptyInput)));
    }

    #[test]
    fn rejects_zero_sample_rate() {
        let text = symbols("abcabc");
        assert!(matches!(
            FmIndex::build(&text, 0, true),
            Err(Error::BuildInvalidSampleRate { sample_rate: 0 })
        ));
    }

    #[test]
    fn multi_sentinel_backward_search() {
        let text = symbols("This \0is a \0long string\0");
        let fm = FmIndex::build(&text, 4, true).unwrap();
        assert_eq!(fm.count(&symbols("is")), 2);
        assert_eq!(fm.count(&symbols("\0")), 3);
    }

    #[test]
    fn extract_round_trips_arbitrary_ranges() {
        let text = symbols("the quick brown fox jumps over the lazy dog");
        let fm = FmIndex::build(&text, 4, true).unwrap();
        let mut buf = vec![0 as Symbol; text.len()];
        for (a, b) in [(0usize, text.len()), (4, 9), (0, 1), (text.len() - 1, text.len())] {
            let written = fm.extract(a as u64, b as u64, &mut buf, 0).unwrap();
            assert_eq!(written as usize, b - a);
            assert_eq!(&buf[..b - a], &text[a..b]);
        }
    }

    #[test]
    fn extract_rejects_when_disabled() {
        let text = symbols("abcabc");
        let fm = FmIndex::build(&text, 4, false).unwrap();
        let mut buf = vec![0 as Symbol; 4];
        assert!(matches!(fm.extract(0, 4, &mut buf, 0), Err(Error::ExtractNotEnabled)));
    }

    #[test]
    fn locate_positions_match_pattern() {
        let text = symbols("abracadabra");
        let fm = FmIndex::build(&text, 2, true).unwrap();
        let pattern = symbols("abra");
        let count = fm.count(&pattern);
        assert_eq!(count, 2);
        let mut dest = vec![0u32; 10];
        let written = fm.locate(&pattern, 0, pattern.len(), &mut dest, -1);
        assert_eq!(written, 2);
        let mut positions: Vec<u32> = dest[..written as usize].to_vec();
        positions.sort_unstable();
        assert_eq!(positions, vec![0, 7]);
    }

    #[test]
    fn extract_until_boundary_splits_on_newline() {
        let text = symbols("first line\nsecond line\nthird");
        let fm = FmIndex::build(&text, 4, true).unwrap();
        let newline = '\n' as u16;
        let mut buf = vec![0 as Symbol; text.len()];
        let from = 2u64; // inside "first line"
        let written = fm.extract_until_boundary(from, &mut buf, 0, newline).unwrap();
        let decoded: String = buf[..written as usize].iter().map(|&s| s as u8 as char).collect();
        assert_eq!(decoded, "first line");

        let next_from = 11u64; // just past the first newline, inside "second line"
        let written2 = fm.extract_until_boundary(next_from, &mut buf, 0, newline).unwrap();
        let decoded2: String = buf[..written2 as usize].iter().map(|&s| s as u8 as char).collect();
        assert_eq!(decoded2, "second line");
    }

    #[test]
    fn extract_until_boundary_rejects_unknown_symbol() {
        let text = symbols("abcabc");
        let fm = FmIndex::build(&text, 4, true).unwrap();
        let mut buf = vec![0 as Symbol; 4];
        assert!(matches!(
            fm.extract_until_boundary(0, &mut buf, 0, 'Z' as u16),
            Err(Error::BoundaryNotInAlphabet)
        ));
    }

    #[test]
    fn count_of_absent_pattern_is_zero() {
        let text = symbols("abcabc");
        let fm = FmIndex::build(&text, 4, true).unwrap();
        assert_eq!(fm.count(&symbols("xyz")), 0);
        assert_eq!(fm.count(&symbols("Z")), 0);
    }

    #[test]
    fn sentinel_is_reserved_internally() {
        let _ = SENTINEL;
    }
}
