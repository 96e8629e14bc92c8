//! Integration tests reproducing the concrete scenarios worked through
//! during development of this crate's rank/access, BWT, and FM-Index
//! contracts: small-text rank/access sanity, BWT shape under a declared
//! symbol order, multi-sentinel backward search, capped locate and
//! boundary-delimited extraction over a log-like corpus, and UTF-8 text
//! with supplementary-plane symbols.

use fbb_fm_index::{convert_utf8_to_symbols, Error, FbbWavelet, FmIndex, Symbol};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn symbols(s: &str) -> Vec<Symbol> {
    s.chars().map(|c| c as u16).collect()
}

fn naive_rank(text: &[u16], pos: i64, c: u16) -> u64 {
    let clamped = pos.clamp(0, text.len() as i64) as usize;
    text[..clamped].iter().filter(|&&x| x == c).count() as u64
}

#[test]
fn small_text_rank_and_access_sanity() {
    let text = symbols("aloha what a string this is string is eh");
    let wt = FbbWavelet::build(&text, 128, 8);

    assert_eq!(wt.rank(6, 'a' as u16), 2);
    assert_eq!(wt.rank(40, 'a' as u16), 4);
    assert_eq!(wt.rank(40, 'h' as u16), 4);
    assert_eq!(wt.rank(19, 'i' as u16), 1);
    assert_eq!(wt.rank(-1, 'i' as u16), 0);
    assert_eq!(wt.access(0), 'a' as u16);
    assert_eq!(wt.access(5), ' ' as u16);
}

#[test]
fn rank_of_symbol_never_seen_is_zero() {
    let text = symbols("aloha what a string this is string is eh");
    let wt = FbbWavelet::build(&text, 128, 8);
    assert_eq!(wt.rank(22, 'Z' as u16), 0);
}

#[test]
fn bwt_shape_for_banana() {
    let text = symbols("BANANA");
    let fm = FmIndex::build(&text, 4, true).unwrap();
    // \0 < A < B < N, so "BANANA\0"'s BWT is "ANNB\0AA". Observed indirectly
    // through the index: "AN" occurs once (crossing the BWT's run of Ns is
    // invisible from outside, but the pattern counts below pin the shape).
    assert_eq!(fm.count(&symbols("A")), 3);
    assert_eq!(fm.count(&symbols("N")), 2);
    assert_eq!(fm.count(&symbols("ANA")), 2);
    assert_eq!(fm.count(&symbols("BANANA")), 1);
}

#[test]
fn backward_search_over_multi_sentinel_text() {
    let text = symbols("This \0is a \0long string\0");
    let fm = FmIndex::build(&text, 4, true).unwrap();
    assert_eq!(fm.count(&symbols("is")), 2);
    assert_eq!(fm.count(&symbols("\0")), 3);
}

/// Builds a deterministic HDFS-log-like corpus of `num_lines` lines, the
/// first of which is pinned to a fixed string so boundary-extraction can be
/// checked against an exact expected value. Every third line carries an
/// "INFO" token.
fn build_log_corpus(num_lines: usize) -> String {
    let first_line =
        "081109 203533 44 INFO root: this file should have 2061 unique characters, including 3 and 4 byte UTF8 encoded";
    let mut lines = vec![first_line.to_string()];
    let mut rng: StdRng = SeedableRng::seed_from_u64(0x1234_5678_9abc_def0);
    for i in 1..num_lines {
        let level = match i % 3 {
            0 => "INFO",
            1 => "WARN",
            _ => "ERROR",
        };
        lines.push(format!(
            "081109 20{:04} {} {} handler: processing block blk_{} on node {}",
            rng.gen_range(0..10_000u32),
            10 + rng.gen_range(0..50u32),
            level,
            rng.gen_range(0..1_000_000u32),
            rng.gen_range(0..64u32),
        ));
    }
    lines.join("\n")
}

#[test]
fn locate_with_cap_over_log_corpus() {
    let corpus = build_log_corpus(2000);
    let text = symbols(&corpus);
    let fm = FmIndex::build(&text, 32, true).unwrap();
    let pattern = symbols("INFO");

    assert!(fm.count(&pattern) >= 100, "corpus should contain at least 100 INFO lines");

    let mut dest = vec![0u32; 100];
    let written = fm.locate(&pattern, 0, pattern.len(), &mut dest, 100);
    assert_eq!(written, 100);

    let mut positions: Vec<u32> = dest.to_vec();
    positions.sort_unstable();
    positions.dedup();
    assert_eq!(positions.len(), 100, "all 100 located positions must be distinct");

    for &pos in &dest {
        let start = pos as usize;
        let found = &corpus.as_bytes()[start..start + 4];
        assert_eq!(found, b"INFO", "position {pos} does not contain INFO");
    }
}

#[test]
fn extract_until_newline_over_log_corpus() {
    let corpus = build_log_corpus(2000);
    let text = symbols(&corpus);
    let fm = FmIndex::build(&text, 32, true).unwrap();
    let newline = '\n' as u16;

    let mut buf = vec![0 as Symbol; text.len()];
    let written = fm.extract_until_boundary(5, &mut buf, 0, newline).unwrap();
    let decoded: String = buf[..written as usize].iter().map(|&s| s as u8 as char).collect();
    assert_eq!(
        decoded,
        "081109 203533 44 INFO root: this file should have 2061 unique characters, including 3 and 4 byte UTF8 encoded"
    );

    let second_line_start = (decoded.len() + 1) as u64;
    let written2 = fm.extract_until_boundary(second_line_start, &mut buf, 0, newline).unwrap();
    let decoded2: String = buf[..written2 as usize].iter().map(|&s| s as u8 as char).collect();
    let expected_second_line = corpus.lines().nth(1).unwrap();
    assert_eq!(decoded2, expected_second_line);
}

#[test]
fn utf8_supplementary_symbols_rank_matches_naive() {
    let text_str =
        "Chodzą jeże koło wieży, 操據支救数料新方旅日旦时映時智更最月有服未本材来東 spotkał je tam pewien Jerzyk.";
    let text = convert_utf8_to_symbols(text_str.as_bytes()).unwrap();
    let sigma = text.iter().copied().max().unwrap() as usize + 1;
    let wt = FbbWavelet::build(&text, sigma, 16);

    let l_with_stroke = 'ł' as u16;
    let zui = '最' as u16;
    let ren = '人' as u16;

    assert_eq!(wt.rank(36, l_with_stroke), naive_rank(&text, 36, l_with_stroke));
    assert_eq!(wt.rank(68, zui), naive_rank(&text, 68, zui));
    assert_eq!(wt.rank(12, ren), 0);
    assert_eq!(naive_rank(&text, 12, ren), 0);
}

#[test]
fn extract_requires_enable_extract() {
    let text = symbols("abcabc");
    let fm = FmIndex::build(&text, 4, false).unwrap();
    let mut buf = vec![0 as Symbol; 4];
    assert!(matches!(fm.extract(0, 4, &mut buf, 0), Err(Error::ExtractNotEnabled)));
}

#[test]
fn build_rejects_empty_text() {
    assert!(matches!(FmIndex::build(&[], 8, true), Err(Error::BuildEmptyInput)));
}
