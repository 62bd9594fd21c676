//! # Concurrent Merkle Tree Account Decoding
//!
//! Decodes the raw bytes of an account-compression tree account into a
//! [`TreeState`]. The 56-byte header is deserialized with the compression
//! program's own `ConcurrentMerkleTreeHeader`. The tree body that follows is
//! generic over depth and buffer size in that crate, so it is walked here by
//! offset. All integers are little-endian:
//!
//! ```text
//! header (56 B)       ConcurrentMerkleTreeHeader (type, version, buffer, depth, authority, slot)
//! tree
//!   sequence_number u64
//!   active_index    u64
//!   buffer_size     u64
//!   change_logs     max_buffer_size × { root [u8;32], path [[u8;32]; depth], index u32, pad u32 }
//!   rightmost_path  { proof [[u8;32]; depth], leaf [u8;32], index u32, pad u32 }
//! canopy            (2^(canopy_depth+1) − 2) × [u8; 32]
//! ```
//!
//! The live root is `change_logs[active_index].root`. The rightmost path's
//! index is the index the next appended leaf will receive.

use borsh::BorshDeserialize;
use cnft_core::{Hash32, LedgerError, Pubkey, TreeState};
use spl_account_compression::state::{ConcurrentMerkleTreeHeader, CONCURRENT_MERKLE_TREE_HEADER_SIZE_V1};

/// Header size in bytes, including the account type and version bytes.
pub const HEADER_LEN: usize = CONCURRENT_MERKLE_TREE_HEADER_SIZE_V1;

/// Offset of the authority key inside the header.
const AUTHORITY_OFFSET: usize = 10;
const NODE_LEN: usize = 32;
/// Depths above this cannot be created by the compression program.
const MAX_SUPPORTED_DEPTH: u32 = 30;

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], String> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| {
                format!(
                    "account data truncated: need {len} bytes at offset {}, have {}",
                    self.pos,
                    self.data.len()
                )
            })?;
        let out = &self.data[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], String> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u32(&mut self) -> Result<u32, String> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    fn u64(&mut self) -> Result<u64, String> {
        Ok(u64::from_le_bytes(self.array()?))
    }

    fn skip(&mut self, len: usize) -> Result<(), String> {
        self.take(len).map(|_| ())
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

/// Decode tree account `data` read from `address`.
///
/// # Errors
///
/// [`LedgerError::InvalidTreeAccount`] when the account type or version is
/// unexpected, the geometry is out of range, the data is truncated, or the
/// trailing canopy is not a whole number of levels.
pub fn decode_tree_account(address: Pubkey, data: &[u8]) -> Result<TreeState, LedgerError> {
    decode(address, data).map_err(|reason| LedgerError::InvalidTreeAccount { address, reason })
}

fn decode(address: Pubkey, data: &[u8]) -> Result<TreeState, String> {
    let header_bytes = data.get(..HEADER_LEN).ok_or_else(|| {
        format!(
            "account data truncated: need {HEADER_LEN} header bytes, have {}",
            data.len()
        )
    })?;
    let header = ConcurrentMerkleTreeHeader::try_from_slice(header_bytes)
        .map_err(|e| format!("malformed tree header: {e}"))?;
    header
        .assert_valid()
        .map_err(|e| format!("not a concurrent merkle tree: {e}"))?;
    let max_buffer_size = header.get_max_buffer_size();
    let max_depth = header.get_max_depth();
    let creation_slot = header.get_creation_slot();
    let mut authority = [0u8; 32];
    authority.copy_from_slice(&header_bytes[AUTHORITY_OFFSET..AUTHORITY_OFFSET + 32]);
    let authority = Pubkey::new_from_array(authority);

    if max_depth == 0 || max_depth > MAX_SUPPORTED_DEPTH {
        return Err(format!("max depth {max_depth} out of range"));
    }
    if max_buffer_size == 0 {
        return Err("max buffer size is zero".into());
    }
    let depth = max_depth as usize;

    let mut r = Reader::new(data, HEADER_LEN);
    let sequence_number = r.u64()?;
    let active_index = r.u64()?;
    let _buffer_size = r.u64()?;
    if active_index >= u64::from(max_buffer_size) {
        return Err(format!(
            "active index {active_index} outside buffer of {max_buffer_size}"
        ));
    }

    let change_log_len = NODE_LEN + NODE_LEN * depth + 8;
    let mut root = None;
    for i in 0..u64::from(max_buffer_size) {
        if i == active_index {
            root = Some(Hash32(r.array()?));
            r.skip(change_log_len - NODE_LEN)?;
        } else {
            r.skip(change_log_len)?;
        }
    }
    let root = root.ok_or("active change log missing")?;

    r.skip(NODE_LEN * depth)?;
    r.skip(NODE_LEN)?;
    let next_leaf_index = u64::from(r.u32()?);
    r.skip(4)?;

    let canopy_depth = canopy_depth(r.remaining())?;
    if canopy_depth > max_depth {
        return Err(format!(
            "canopy depth {canopy_depth} exceeds max depth {max_depth}"
        ));
    }

    Ok(TreeState {
        address,
        max_depth,
        max_buffer_size,
        canopy_depth,
        root,
        authority,
        creation_slot,
        sequence_number,
        next_leaf_index,
    })
}

/// Canopy depth for a trailing region of `bytes` bytes.
///
/// A canopy of depth `c` caches every node of the top `c` levels below the
/// root: `2^(c+1) - 2` nodes.
fn canopy_depth(bytes: usize) -> Result<u32, String> {
    if bytes % NODE_LEN != 0 {
        return Err(format!("canopy of {bytes} bytes is not whole nodes"));
    }
    let nodes = bytes / NODE_LEN;
    let levels = nodes + 2;
    if !levels.is_power_of_two() {
        return Err(format!("canopy of {nodes} nodes is not whole levels"));
    }
    Ok(levels.trailing_zeros() - 1)
}

/// Size of a tree account for the given geometry.
pub fn account_size(max_depth: u32, max_buffer_size: u32, canopy_depth: u32) -> usize {
    let depth = max_depth as usize;
    let change_log = NODE_LEN + NODE_LEN * depth + 8;
    let rightmost = NODE_LEN * depth + NODE_LEN + 8;
    let canopy = ((1usize << (canopy_depth + 1)) - 2) * NODE_LEN;
    HEADER_LEN + 24 + change_log * max_buffer_size as usize + rightmost + canopy
}
