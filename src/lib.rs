#![allow(clippy::len_without_is_empty)]

mod alphabet;
mod bitops;
mod bwt;
mod error;
mod heap_size;
mod huffman;
mod fm_index;
mod packed_fixed;
mod packed_var;
mod rrr;
mod serializer;
mod suffix_array;
mod wavelet;

pub use crate::alphabet::{convert_utf8_to_symbols, convert_utf8_to_symbols_into, Alphabet, Symbol, MAX_SYMBOL};
pub use crate::error::Error;
pub use crate::fm_index::FmIndex;
pub use crate::packed_fixed::PackedFixedIntVec;
pub use crate::packed_var::PackedVarIntVec;
pub use crate::rrr::RrrBitVec;
pub use crate::serializer::CURRENT_VERSION;
pub use crate::wavelet::FbbWavelet;
