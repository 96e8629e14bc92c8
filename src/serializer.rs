//! Versioned big-endian binary framing for every serializable type in this
//! crate: a `serialVersion: u8` byte, then component-specific fields in a
//! fixed order, multi-byte integers big-endian, arrays framed as
//! `length: i32` followed by elements.

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::alphabet::Alphabet;
use crate::error::Error;
use crate::fm_index::FmIndex;
use crate::huffman::{CodeWord, HuffmanCode};
use crate::packed_fixed::PackedFixedIntVec;
use crate::packed_var::PackedVarIntVec;
use crate::rrr::RrrBitVec;
use crate::wavelet::{Block, Child, FbbWavelet, SuperBlock, TrieNode};

/// The only version byte this build emits or accepts.
pub const CURRENT_VERSION: u8 = 0;

fn truncated(reason: &'static str) -> Error {
    Error::SerdeTruncated { reason }
}

fn write_u64_vec(out: &mut Vec<u8>, words: &[u64]) {
    out.write_i32::<BigEndian>(words.len() as i32).unwrap();
    for &w in words {
        out.write_u64::<BigEndian>(w).unwrap();
    }
}

fn read_u64_vec(input: &mut &[u8]) -> Result<Vec<u64>, Error> {
    let len = input.read_i32::<BigEndian>().map_err(|_| truncated("u64 array length"))? as usize;
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        out.push(input.read_u64::<BigEndian>().map_err(|_| truncated("u64 array element"))?);
    }
    Ok(out)
}

fn write_u32_vec(out: &mut Vec<u8>, words: &[u32]) {
    out.write_i32::<BigEndian>(words.len() as i32).unwrap();
    for &w in words {
        out.write_u32::<BigEndian>(w).unwrap();
    }
}

fn read_u32_vec(input: &mut &[u8]) -> Result<Vec<u32>, Error> {
    let len = input.read_i32::<BigEndian>().map_err(|_| truncated("u32 array length"))? as usize;
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        out.push(input.read_u32::<BigEndian>().map_err(|_| truncated("u32 array element"))?);
    }
    Ok(out)
}

fn write_option_u32_vec(out: &mut Vec<u8>, values: &[Option<u32>]) {
    out.write_i32::<BigEndian>(values.len() as i32).unwrap();
    for &v in values {
        out.write_i64::<BigEndian>(v.map(|x| x as i64).unwrap_or(-1)).unwrap();
    }
}

fn read_option_u32_vec(input: &mut &[u8]) -> Result<Vec<Option<u32>>, Error> {
    let len = input.read_i32::<BigEndian>().map_err(|_| truncated("optional array length"))? as usize;
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        let raw = input.read_i64::<BigEndian>().map_err(|_| truncated("optional array element"))?;
        out.push(if raw < 0 { None } else { Some(raw as u32) });
    }
    Ok(out)
}

fn read_version(input: &mut &[u8]) -> Result<(), Error> {
    let found = input.read_u8().map_err(|_| truncated("serialVersion byte"))?;
    if found != CURRENT_VERSION {
        return Err(Error::SerdeVersionMismatch {
            found,
            expected: CURRENT_VERSION,
        });
    }
    Ok(())
}

impl PackedFixedIntVec {
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.push(CURRENT_VERSION);
        out.write_i32::<BigEndian>(self.len() as i32).unwrap();
        out.write_u32::<BigEndian>(self.width()).unwrap();
        write_u64_vec(&mut out, self.words());
        out
    }

    pub fn deserialize(input: &mut &[u8]) -> Result<PackedFixedIntVec, Error> {
        read_version(input)?;
        let length = input.read_i32::<BigEndian>().map_err(|_| truncated("PackedFixedIntVec length"))? as usize;
        let width = input.read_u32::<BigEndian>().map_err(|_| truncated("PackedFixedIntVec width"))?;
        let words = read_u64_vec(input)?;
        let mut v = PackedFixedIntVec::new(length, width.max(1));
        for (i, &w) in words.iter().enumerate() {
            v.set_word(i, w);
        }
        Ok(v)
    }
}

impl PackedVarIntVec {
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.push(CURRENT_VERSION);
        out.write_i64::<BigEndian>(self.len_bits() as i64).unwrap();
        write_u64_vec(&mut out, self.words());
        out
    }

    pub fn deserialize(input: &mut &[u8]) -> Result<PackedVarIntVec, Error> {
        read_version(input)?;
        let num_bits = input.read_i64::<BigEndian>().map_err(|_| truncated("PackedVarIntVec bit length"))? as usize;
        let words = read_u64_vec(input)?;
        let mut v = PackedVarIntVec::with_bit_capacity(num_bits);
        let mut remaining = num_bits;
        let mut offset = 0usize;
        for &w in &words {
            let take = remaining.min(64);
            if take > 0 {
                v.push(w & crate::bitops::low_mask(take as u32), take as u32);
            }
            offset += take;
            remaining = remaining.saturating_sub(64);
        }
        let _ = offset;
        Ok(v)
    }
}

impl RrrBitVec {
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.push(CURRENT_VERSION);
        out.write_i64::<BigEndian>(self.len() as i64).unwrap();
        out.write_i64::<BigEndian>(self.sample_period() as i64).unwrap();
        write_u64_vec(&mut out, self.raw_words());
        out.extend(self.samples1().serialize());
        out
    }

    pub fn deserialize(input: &mut &[u8]) -> Result<RrrBitVec, Error> {
        read_version(input)?;
        let len = input.read_i64::<BigEndian>().map_err(|_| truncated("RrrBitVec length"))? as usize;
        let sample_period = input.read_i64::<BigEndian>().map_err(|_| truncated("RrrBitVec sample period"))? as usize;
        let raw = read_u64_vec(input)?;
        let _samples1 = PackedFixedIntVec::deserialize(input)?;
        // samples1 is fully determined by (raw, len, sample_period); rebuild
        // it rather than trust the serialized copy, which keeps this type's
        // rank/access invariants from ever depending on untrusted bytes.
        Ok(RrrBitVec::from_words(raw, len, sample_period.max(1)))
    }
}

impl CodeWord {
    fn write(&self, out: &mut Vec<u8>) {
        out.write_u32::<BigEndian>(self.code).unwrap();
        out.write_u32::<BigEndian>(self.length).unwrap();
    }

    fn read(input: &mut &[u8]) -> Result<CodeWord, Error> {
        let code = input.read_u32::<BigEndian>().map_err(|_| truncated("CodeWord code"))?;
        let length = input.read_u32::<BigEndian>().map_err(|_| truncated("CodeWord length"))?;
        Ok(CodeWord { code, length })
    }
}

fn write_huffman_code(out: &mut Vec<u8>, code: &HuffmanCode) {
    out.write_i32::<BigEndian>(code.words.len() as i32).unwrap();
    for w in &code.words {
        w.write(out);
    }
    out.write_u32::<BigEndian>(code.tree_height).unwrap();
}

fn read_huffman_code(input: &mut &[u8]) -> Result<HuffmanCode, Error> {
    let len = input.read_i32::<BigEndian>().map_err(|_| truncated("HuffmanCode word count"))? as usize;
    let mut words = Vec::with_capacity(len);
    for _ in 0..len {
        words.push(CodeWord::read(input)?);
    }
    let tree_height = input.read_u32::<BigEndian>().map_err(|_| truncated("HuffmanCode tree height"))?;
    Ok(HuffmanCode { words, tree_height })
}

fn write_child(out: &mut Vec<u8>, child: &Child) {
    match *child {
        Child::Node(id) => {
            out.push(0);
            out.write_u32::<BigEndian>(id as u32).unwrap();
        }
        Child::Leaf(leaf) => {
            out.push(1);
            out.write_u32::<BigEndian>(leaf).unwrap();
        }
    }
}

fn read_child(input: &mut &[u8]) -> Result<Child, Error> {
    let tag = input.read_u8().map_err(|_| truncated("Child tag"))?;
    let value = input.read_u32::<BigEndian>().map_err(|_| truncated("Child value"))?;
    match tag {
        0 => Ok(Child::Node(value as usize)),
        1 => Ok(Child::Leaf(value)),
        _ => Err(truncated("unrecognised Child tag")),
    }
}

fn write_trie_node(out: &mut Vec<u8>, node: &TrieNode) {
    out.extend(node.bits.serialize());
    write_child(out, &node.left);
    write_child(out, &node.right);
}

fn read_trie_node(input: &mut &[u8]) -> Result<TrieNode, Error> {
    let bits = RrrBitVec::deserialize(input)?;
    let left = read_child(input)?;
    let right = read_child(input)?;
    Ok(TrieNode { bits, left, right })
}

fn write_block(out: &mut Vec<u8>, block: &Block) {
    out.write_u32::<BigEndian>(block.tree_height).unwrap();
    out.write_i32::<BigEndian>(block.nodes.len() as i32).unwrap();
    for node in &block.nodes {
        write_trie_node(out, node);
    }
    write_huffman_code(out, &block.code);
    write_u32_vec(out, &block.leaf_to_superchar);
    write_u64_vec(out, &block.rank_at_block_boundary);
}

fn read_block(input: &mut &[u8]) -> Result<Block, Error> {
    let tree_height = input.read_u32::<BigEndian>().map_err(|_| truncated("Block tree height"))?;
    let num_nodes = input.read_i32::<BigEndian>().map_err(|_| truncated("Block node count"))? as usize;
    let mut nodes = Vec::with_capacity(num_nodes);
    for _ in 0..num_nodes {
        nodes.push(read_trie_node(input)?);
    }
    let code = read_huffman_code(input)?;
    let leaf_to_superchar = read_u32_vec(input)?;
    let rank_at_block_boundary = read_u64_vec(input)?;
    Ok(Block::from_parts(tree_height, nodes, code, leaf_to_superchar, rank_at_block_boundary))
}

fn write_superblock(out: &mut Vec<u8>, sb: &SuperBlock) {
    out.write_u32::<BigEndian>(sb.block_size_log).unwrap();
    out.write_i32::<BigEndian>(sb.blocks.len() as i32).unwrap();
    for block in &sb.blocks {
        write_block(out, block);
    }
    write_u32_vec(out, &sb.superchar_to_global);
    out.write_i32::<BigEndian>(sb.mapping.len() as i32).unwrap();
    for row in &sb.mapping {
        write_option_u32_vec(out, row);
    }
}

fn read_superblock(input: &mut &[u8]) -> Result<SuperBlock, Error> {
    let block_size_log = input.read_u32::<BigEndian>().map_err(|_| truncated("SuperBlock block size log"))?;
    let num_blocks = input.read_i32::<BigEndian>().map_err(|_| truncated("SuperBlock block count"))? as usize;
    let mut blocks = Vec::with_capacity(num_blocks);
    for _ in 0..num_blocks {
        blocks.push(read_block(input)?);
    }
    let superchar_to_global = read_u32_vec(input)?;
    let num_rows = input.read_i32::<BigEndian>().map_err(|_| truncated("SuperBlock mapping row count"))? as usize;
    let mut mapping = Vec::with_capacity(num_rows);
    for _ in 0..num_rows {
        mapping.push(read_option_u32_vec(input)?);
    }
    Ok(SuperBlock::from_parts(block_size_log, blocks, superchar_to_global, mapping))
}

impl FbbWavelet {
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.push(CURRENT_VERSION);
        out.write_i64::<BigEndian>(self.len() as i64).unwrap();
        out.write_i64::<BigEndian>(self.alphabet_size() as i64).unwrap();
        write_u64_vec(&mut out, self.count_table());
        write_u64_vec(&mut out, self.hyper_block_rank_table());
        write_u64_vec(&mut out, self.super_block_rank_table());
        write_option_u32_vec(&mut out, self.global_mapping_table());
        out.write_i32::<BigEndian>(self.superblocks_table().len() as i32).unwrap();
        for sb in self.superblocks_table() {
            write_superblock(&mut out, sb);
        }
        out
    }

    pub fn deserialize(input: &mut &[u8]) -> Result<FbbWavelet, Error> {
        read_version(input)?;
        let n = input.read_i64::<BigEndian>().map_err(|_| truncated("FbbWavelet length"))? as usize;
        let sigma = input.read_i64::<BigEndian>().map_err(|_| truncated("FbbWavelet sigma"))? as usize;
        let count = read_u64_vec(input)?;
        let hyper_block_rank = read_u64_vec(input)?;
        let super_block_rank = read_u64_vec(input)?;
        let global_mapping = read_option_u32_vec(input)?;
        let num_superblocks = input.read_i32::<BigEndian>().map_err(|_| truncated("superblock count"))? as usize;
        let mut superblocks = Vec::with_capacity(num_superblocks);
        for _ in 0..num_superblocks {
            superblocks.push(read_superblock(input)?);
        }
        Ok(FbbWavelet::from_parts(n, sigma, count, hyper_block_rank, super_block_rank, global_mapping, superblocks))
    }
}

impl Alphabet {
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.push(CURRENT_VERSION);
        out.write_i32::<BigEndian>(self.sigma() as i32).unwrap();
        let symbols: Vec<u32> = (0..self.sigma() as u16).map(|m| self.original_symbol(m) as u32).collect();
        write_u32_vec(&mut out, &symbols);
        out
    }

    pub fn deserialize(input: &mut &[u8]) -> Result<Alphabet, Error> {
        read_version(input)?;
        let _sigma = input.read_i32::<BigEndian>().map_err(|_| truncated("Alphabet sigma"))?;
        let symbols = read_u32_vec(input)?;
        Ok(Alphabet::from_mapped_symbols(symbols.iter().map(|&s| s as u16).collect()))
    }
}

impl FmIndex {
    /// Serializes the whole index: version byte, then every component in
    /// build order.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.push(CURRENT_VERSION);
        out.extend(self.alphabet_table().serialize());
        out.write_i64::<BigEndian>(self.input_length() as i64).unwrap();
        out.extend(self.bwt_table().serialize());
        write_u64_vec(&mut out, self.cumulative_counts_table());
        out.extend(self.sampled_suffixes_table().serialize());
        out.extend(self.sampled_bitmap_table().serialize());
        out.write_u8(self.positions_table().is_some() as u8).unwrap();
        if let Some(positions) = self.positions_table() {
            out.extend(positions.serialize());
        }
        out.write_u32::<BigEndian>(self.sample_rate_value()).unwrap();
        out.write_u8(self.enable_extract_value() as u8).unwrap();
        out
    }

    pub fn deserialize(input: &mut &[u8]) -> Result<FmIndex, Error> {
        read_version(input)?;
        let alphabet = Alphabet::deserialize(input)?;
        let n = input.read_i64::<BigEndian>().map_err(|_| truncated("FmIndex text length"))? as usize;
        let bwt = FbbWavelet::deserialize(input)?;
        let cumulative_counts = read_u64_vec(input)?;
        let sampled_suffixes = PackedFixedIntVec::deserialize(input)?;
        let sampled_bitmap = RrrBitVec::deserialize(input)?;
        let has_positions = input.read_u8().map_err(|_| truncated("FmIndex positions presence flag"))? != 0;
        let positions = if has_positions {
            Some(PackedFixedIntVec::deserialize(input)?)
        } else {
            None
        };
        let sample_rate = input.read_u32::<BigEndian>().map_err(|_| truncated("FmIndex sample rate"))?;
        let enable_extract = input.read_u8().map_err(|_| truncated("FmIndex enable_extract flag"))? != 0;
        Ok(FmIndex::from_parts(
            alphabet,
            n,
            bwt,
            cumulative_counts,
            sampled_suffixes,
            sampled_bitmap,
            positions,
            sample_rate,
            enable_extract,
        ))
    }
}
