//! Canonical Huffman code-length assignment with deterministic tie-breaking,
//! used per-block inside [`crate::wavelet`].

use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// A symbol's position in the canonical code: `(code, length)`. `length ==
/// 0` means the symbol does not occur in the block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CodeWord {
    pub code: u32,
    pub length: u32,
}

/// The canonical Huffman code for one block: a length (and, derived from
/// it, a code) per local symbol id, plus the resulting tree height.
#[derive(Clone, Debug)]
pub struct HuffmanCode {
    pub words: Vec<CodeWord>,
    pub tree_height: u32,
}

impl HuffmanCode {
    /// Computes a canonical Huffman code over `freq` (indexed by local
    /// symbol id). A block with at most one distinct symbol gets tree
    /// height 0 and no code: there is nothing to distinguish by bit-vector.
    pub fn build(freq: &[u64]) -> HuffmanCode {
        let present: Vec<u32> = (0..freq.len() as u32).filter(|&s| freq[s as usize] > 0).collect();
        let mut words = vec![CodeWord::default(); freq.len()];

        if present.len() <= 1 {
            return HuffmanCode {
                words,
                tree_height: 0,
            };
        }

        let lengths = Self::assign_lengths(freq, &present);
        let tree_height = lengths.iter().copied().max().unwrap_or(0);

        // Canonical code assignment: sort by (length asc, symbol id asc),
        // then emit successive codes, left-shifting by the change in length.
        let mut order: Vec<usize> = (0..present.len()).collect();
        order.sort_by_key(|&i| (lengths[i], present[i]));

        let mut code: u32 = 0;
        let mut prev_length = lengths[order[0]];
        for (rank, &i) in order.iter().enumerate() {
            let length = lengths[i];
            if rank > 0 {
                code = (code + 1) << (length - prev_length);
            }
            words[present[i] as usize] = CodeWord { code, length };
            prev_length = length;
        }

        HuffmanCode { words, tree_height }
    }

    /// Standard priority-queue Huffman length assignment: repeatedly merge
    /// the two lowest-weight nodes, tracking the set of symbols each node
    /// covers so that ties are broken deterministically on `(weight asc,
    /// covered symbol-id list asc)` rather than arbitrarily.
    fn assign_lengths(freq: &[u64], present: &[u32]) -> Vec<u32> {
        let mut heap: BinaryHeap<Reverse<HeapNode>> = BinaryHeap::new();
        for &sym in present {
            heap.push(Reverse(HeapNode {
                weight: freq[sym as usize],
                covered: vec![sym],
            }));
        }

        let mut lengths = vec![0u32; present.len()];
        let index_of: std::collections::HashMap<u32, usize> =
            present.iter().enumerate().map(|(i, &s)| (s, i)).collect();

        while heap.len() > 1 {
            let Reverse(a) = heap.pop().unwrap();
            let Reverse(b) = heap.pop().unwrap();
            for &sym in a.covered.iter().chain(b.covered.iter()) {
                lengths[index_of[&sym]] += 1;
            }
            let mut covered = a.covered;
            covered.extend(b.covered);
            covered.sort_unstable();
            heap.push(Reverse(HeapNode {
                weight: a.weight + b.weight,
                covered,
            }));
        }

        lengths
    }
}

/// A merge-queue entry: weight plus the sorted list of leaf symbols it
/// covers, used only to break weight ties deterministically.
#[derive(Clone, Eq, PartialEq)]
struct HeapNode {
    weight: u64,
    covered: Vec<u32>,
}

impl Ord for HeapNode {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.weight
            .cmp(&other.weight)
            .then_with(|| self.covered.cmp(&other.covered))
    }
}

impl PartialOrd for HeapNode {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_symbol_has_height_zero() {
        let freq = [0u64, 42, 0];
        let code = HuffmanCode::build(&freq);
        assert_eq!(code.tree_height, 0);
        assert_eq!(code.words[1].length, 0);
    }

    #[test]
    fn bit_length_matches_expected_encoded_size() {
        // Classic example: frequencies 5,9,12,13,16,45 (symbols 0..=5).
        let freq = [5u64, 9, 12, 13, 16, 45];
        let code = HuffmanCode::build(&freq);
        let total_bits: u64 = freq
            .iter()
            .zip(code.words.iter())
            .map(|(&f, w)| f * w.length as u64)
            .sum();
        // Optimal prefix code for this distribution costs 224 bits.
        assert_eq!(total_bits, 224);
    }

    #[test]
    fn codes_form_a_valid_prefix_code() {
        let freq = [3u64, 1, 1, 1, 1, 1, 1, 1];
        let code = HuffmanCode::build(&freq);
        let mut codes: Vec<(u32, u32)> = code
            .words
            .iter()
            .filter(|w| w.length > 0)
            .map(|w| (w.code, w.length))
            .collect();
        codes.sort_by_key(|&(_, l)| l);
        for i in 0..codes.len() {
            for j in (i + 1)..codes.len() {
                let (ci, li) = codes[i];
                let (cj, lj) = codes[j];
                assert!(li <= lj);
                assert_ne!(ci, cj >> (lj - li), "code {i} is a prefix of code {j}");
            }
        }
    }

    #[test]
    fn deterministic_tie_break_is_reproducible() {
        let freq = [1u64, 1, 1, 1];
        let a = HuffmanCode::build(&freq);
        let b = HuffmanCode::build(&freq);
        assert_eq!(
            a.words.iter().map(|w| w.length).collect::<Vec<_>>(),
            b.words.iter().map(|w| w.length).collect::<Vec<_>>()
        );
    }
}
