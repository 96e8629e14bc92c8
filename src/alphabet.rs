//! Monotone alphabet mapping between raw user symbols (Unicode code points,
//! or any caller-chosen integers) and the dense, sentinel-first id space the
//! rest of the index operates on.

use std::collections::BTreeSet;
use std::collections::HashMap;

use crate::error::Error;
use crate::heap_size::HeapSize;

/// A raw user-facing symbol: a non-negative integer `<= 32,767`. Typically a
/// Unicode code point, but the index does not require that interpretation.
pub type Symbol = u16;

/// The largest value a [`Symbol`] may take.
pub const MAX_SYMBOL: u32 = 32_767;

/// The reserved sentinel's internal mapped id. Always `0`, always
/// lexicographically smaller than every other mapped id.
pub const SENTINEL: u16 = 0;

/// A bijection between the user symbols observed in a text and dense mapped
/// ids `{0, ..., sigma-1}`, `0` reserved for the sentinel. The mapping is
/// monotone: mapped ids increase in the same order as the user symbols they
/// represent, which is what lets the mapped integer sequence's lexicographic
/// order track the original text's order for BWT/suffix-array purposes.
#[derive(Debug, Clone)]
pub struct Alphabet {
    sigma: usize,
    symbol_to_mapped: HashMap<Symbol, u16>,
    mapped_to_symbol: Vec<Symbol>,
}

impl HeapSize for Alphabet {
    fn heap_size(&self) -> usize {
        self.symbol_to_mapped.capacity() * std::mem::size_of::<(Symbol, u16)>()
            + self.mapped_to_symbol.capacity() * std::mem::size_of::<Symbol>()
    }
}

impl Alphabet {
    /// Discovers the alphabet of `text` and builds the monotone mapping.
    /// Fails with `Build/AlphabetTooLarge` if more than 32,767 distinct
    /// symbols are present (the sentinel would then not fit in the `u16`
    /// mapped-id space alongside them).
    pub fn build(text: &[Symbol]) -> Result<Alphabet, Error> {
        let distinct: BTreeSet<Symbol> = text.iter().copied().collect();
        if distinct.len() > MAX_SYMBOL as usize {
            return Err(Error::BuildAlphabetTooLarge {
                distinct_symbols: distinct.len(),
            });
        }
        let sigma = distinct.len() + 1;
        let mut symbol_to_mapped = HashMap::with_capacity(distinct.len());
        let mut mapped_to_symbol = vec![0 as Symbol; sigma];
        for (i, &sym) in distinct.iter().enumerate() {
            let id = (i + 1) as u16;
            symbol_to_mapped.insert(sym, id);
            mapped_to_symbol[id as usize] = sym;
        }
        Ok(Alphabet {
            sigma,
            symbol_to_mapped,
            mapped_to_symbol,
        })
    }

    /// Alphabet size, sentinel included.
    pub fn sigma(&self) -> usize {
        self.sigma
    }

    /// The mapped id for a user symbol, or `None` if it never occurred in
    /// the text this alphabet was built from.
    pub fn mapped_id(&self, symbol: Symbol) -> Option<u16> {
        self.symbol_to_mapped.get(&symbol).copied()
    }

    /// The user symbol a mapped id (other than the sentinel) represents.
    pub fn original_symbol(&self, mapped: u16) -> Symbol {
        self.mapped_to_symbol[mapped as usize]
    }

    /// Reassembles an `Alphabet` from a serialized `mapped id -> symbol`
    /// table (index `0`, the sentinel, is ignored), in [`crate::serializer`].
    pub(crate) fn from_mapped_symbols(mapped_to_symbol: Vec<Symbol>) -> Alphabet {
        let sigma = mapped_to_symbol.len();
        let mut symbol_to_mapped = HashMap::with_capacity(sigma.saturating_sub(1));
        for (id, &sym) in mapped_to_symbol.iter().enumerate().skip(1) {
            symbol_to_mapped.insert(sym, id as u16);
        }
        Alphabet {
            sigma,
            symbol_to_mapped,
            mapped_to_symbol,
        }
    }

    /// Maps `text` to mapped ids and appends the sentinel, producing the
    /// `n+1`-long sequence the rest of the index is built over.
    pub fn map_and_terminate(&self, text: &[Symbol]) -> Vec<u16> {
        let mut out = Vec::with_capacity(text.len() + 1);
        for &sym in text {
            out.push(self.symbol_to_mapped[&sym]);
        }
        out.push(SENTINEL);
        out
    }
}

/// Decodes `bytes` as UTF-8 (invalid sequences are replaced with U+FFFD, as
/// `String::from_utf8_lossy` does) into a vector of [`Symbol`]s. Fails with
/// `Encoding/OverflowsAlphabet` if any code point exceeds 32,767.
pub fn convert_utf8_to_symbols(bytes: &[u8]) -> Result<Vec<Symbol>, Error> {
    let text = String::from_utf8_lossy(bytes);
    let mut out = Vec::with_capacity(text.len());
    for ch in text.chars() {
        let code_point = ch as u32;
        if code_point > MAX_SYMBOL {
            return Err(Error::EncodingOverflowsAlphabet { code_point });
        }
        out.push(code_point as Symbol);
    }
    Ok(out)
}

/// Slice-writing variant matching the C-style `dest[]` out-parameter
/// convention used elsewhere in this crate's extraction methods. Fails with
/// `Extract/DestTooSmall` if `dest` cannot hold the decoded symbols.
pub fn convert_utf8_to_symbols_into(bytes: &[u8], dest: &mut [Symbol]) -> Result<u32, Error> {
    let symbols = convert_utf8_to_symbols(bytes)?;
    if symbols.len() > dest.len() {
        return Err(Error::ExtractDestTooSmall {
            needed: symbols.len(),
            available: dest.len(),
        });
    }
    dest[..symbols.len()].copy_from_slice(&symbols);
    Ok(symbols.len() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_is_monotone_in_symbol_order() {
        let text: Vec<Symbol> = vec![20, 5, 20, 100, 5, 3];
        let alphabet = Alphabet::build(&text).unwrap();
        let mapped: Vec<u16> = [3u16, 5, 20, 100]
            .iter()
            .map(|&s| alphabet.mapped_id(s).unwrap())
            .collect();
        let mut sorted = mapped.clone();
        sorted.sort_unstable();
        assert_eq!(mapped, sorted, "mapped ids must increase with symbol value");
    }

    #[test]
    fn sentinel_is_reserved_even_if_symbol_zero_is_present() {
        let text: Vec<Symbol> = vec![0, 1, 2];
        let alphabet = Alphabet::build(&text).unwrap();
        assert_ne!(alphabet.mapped_id(0).unwrap(), SENTINEL);
        assert_eq!(alphabet.sigma(), 4);
    }

    #[test]
    fn round_trip_symbol_and_mapped_id() {
        let text: Vec<Symbol> = "BANANA".chars().map(|c| c as u16).collect();
        let alphabet = Alphabet::build(&text).unwrap();
        for &sym in &text {
            let mapped = alphabet.mapped_id(sym).unwrap();
            assert_eq!(alphabet.original_symbol(mapped), sym);
        }
    }

    #[test]
    fn alphabet_too_large_is_rejected() {
        let text: Vec<Symbol> = (0..=MAX_SYMBOL as u32).map(|c| c as u16).collect();
        assert!(matches!(
            Alphabet::build(&text),
            Err(Error::BuildAlphabetTooLarge { .. })
        ));
    }

    #[test]
    fn utf8_supplementary_symbols_decode() {
        let text = "Chodzą jeże koło wieży";
        let symbols = convert_utf8_to_symbols(text.as_bytes()).unwrap();
        assert_eq!(symbols.len(), text.chars().count());
        assert_eq!(symbols[5], 'ą' as u16);
    }
}
