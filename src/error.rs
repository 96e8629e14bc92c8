//! Error tags for this crate.
//!
//! A single hand-rolled `enum` with manual `Display`/`std::error::Error`
//! impls rather than a derive macro: the set of error kinds is small and
//! fixed, and each variant's message is part of the documented contract.

/// An error produced by a fallible operation on an index or one of its
/// succinct components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// `Build/EmptyInput` — a component that requires non-empty input was
    /// given an empty text.
    BuildEmptyInput,
    /// `Build/InvalidSampleRate` — `sample_rate` must be a positive integer.
    BuildInvalidSampleRate { sample_rate: u32 },
    /// `Build/AlphabetTooLarge` — more than 32,767 distinct symbols.
    BuildAlphabetTooLarge { distinct_symbols: usize },
    /// `Encoding/OverflowsAlphabet` — a decoded UTF-8 code point exceeds
    /// 32,767 and cannot be represented as a [`crate::alphabet::Symbol`].
    EncodingOverflowsAlphabet { code_point: u32 },
    /// `Query/OutOfRange` — a position argument fell outside a component's
    /// valid range, for components whose contract does not clamp.
    QueryOutOfRange { pos: i64, len: usize },
    /// `Extract/NotEnabled` — `extract*` called on an index built with
    /// `enable_extract = false`.
    ExtractNotEnabled,
    /// `Extract/DestTooSmall` — the output buffer cannot hold the result.
    ExtractDestTooSmall { needed: usize, available: usize },
    /// `Extract/OutOfRange` — `start`/`stop` violate `0 <= start <= stop <= n`.
    ExtractOutOfRange { start: u64, stop: u64, len: u64 },
    /// `Boundary/NotInAlphabet` — the boundary symbol passed to
    /// `extract_until_boundary*` is absent from the indexed alphabet.
    BoundaryNotInAlphabet,
    /// `Serde/VersionMismatch` — a deserialized `serialVersion` byte did not
    /// match the version this build supports.
    SerdeVersionMismatch { found: u8, expected: u8 },
    /// Deserialization ran out of input before a framed value was complete.
    /// Not itself a spec-named error tag, but the natural companion to
    /// `Serde/VersionMismatch` for corrupt or truncated byte streams.
    SerdeTruncated { reason: &'static str },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::BuildEmptyInput => write!(f, "cannot build an index over an empty input"),
            Error::BuildInvalidSampleRate { sample_rate } => {
                write!(f, "sample_rate must be a positive integer, got {sample_rate}")
            }
            Error::BuildAlphabetTooLarge { distinct_symbols } => write!(
                f,
                "alphabet has {distinct_symbols} distinct symbols, more than the 32767 limit",
            ),
            Error::EncodingOverflowsAlphabet { code_point } => write!(
                f,
                "code point U+{code_point:X} overflows the 32767-symbol alphabet",
            ),
            Error::QueryOutOfRange { pos, len } => {
                write!(f, "position {pos} is out of range [0, {len})")
            }
            Error::ExtractNotEnabled => write!(
                f,
                "extract was called but the index was built with enable_extract=false"
            ),
            Error::ExtractDestTooSmall { needed, available } => write!(
                f,
                "destination buffer has room for {available} symbols but {needed} are needed",
            ),
            Error::ExtractOutOfRange { start, stop, len } => write!(
                f,
                "extract range [{start}, {stop}) is invalid for a text of length {len}",
            ),
            Error::BoundaryNotInAlphabet => {
                write!(f, "boundary symbol is not present in the indexed alphabet")
            }
            Error::SerdeVersionMismatch { found, expected } => write!(
                f,
                "serialized version {found} does not match the supported version {expected}",
            ),
            Error::SerdeTruncated { reason } => {
                write!(f, "serialized data is truncated or corrupt: {reason}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}
