use zerocopy::{FromBytes, Immutable, KnownLayout};

/// One internal node: two pixel offsets in normalized [-128, 127] window
/// coordinates, stored as packed signed bytes in breadth-first order.
#[derive(FromBytes, Immutable, KnownLayout, Debug, Clone, Copy)]
#[repr(C)]
pub(crate) struct RawNode {
    pub r1: i8,
    pub c1: i8,
    pub r2: i8,
    pub c2: i8,
}

/// One decision tree: `2^tdepth - 1` internal nodes (breadth-first, 1-based
/// heap order so `nodes[i - 1]` is the node at heap index `i`), `2^tdepth`
/// leaf contributions, and a cumulative-score stage threshold.
#[derive(Debug, Clone)]
pub(crate) struct Tree {
    pub nodes: Vec<RawNode>,
    pub leaves: Vec<f32>,
    pub threshold: f32,
}

impl Tree {
    /// Parses one tree record from `bytes`, returning the tree and the
    /// number of bytes consumed. `bytes` must be at least as long as the
    /// record; the caller (the cascade loader) has already validated the
    /// total blob length against `tdepth`/`ntrees`.
    pub(crate) fn parse(bytes: &[u8], tdepth: u32) -> Option<(Tree, usize)> {
        let num_nodes = (1usize << tdepth) - 1;
        let num_leaves = 1usize << tdepth;

        let node_bytes = num_nodes * std::mem::size_of::<RawNode>();
        let leaf_bytes = num_leaves * std::mem::size_of::<f32>();
        let threshold_bytes = std::mem::size_of::<f32>();
        let record_len = node_bytes + leaf_bytes + threshold_bytes;

        if bytes.len() < record_len {
            return None;
        }

        let mut offset = 0;
        let nodes = <[RawNode]>::ref_from_bytes(&bytes[offset..offset + node_bytes])
            .ok()?
            .to_vec();
        offset += node_bytes;

        let leaves = bytes[offset..offset + leaf_bytes]
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes(c.try_into().unwrap()))
            .collect();
        offset += leaf_bytes;

        let threshold = f32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap());
        offset += threshold_bytes;

        Some((
            Tree {
                nodes,
                leaves,
                threshold,
            },
            offset,
        ))
    }
}
