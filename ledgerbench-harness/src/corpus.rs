//! Synthetic transfer data and the query parameters drawn from it.

use ledgerbench_common::{Lookup, Transfer};
use rand::Rng;

use crate::workload::Category;

/// Fixed sender/receiver pool. Transfers cycle through it so address lookups
/// return many rows.
pub const TEST_ADDRESSES: [&str; 5] = [
    "0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb0",
    "0x8ba1f109551bD432803012645Aac136c22C929E7",
    "0x1234567890123456789012345678901234567890",
    "0xabcdefabcdefabcdefabcdefabcdefabcdefabcd",
    "0xfedcba9876543210fedcba9876543210fedcba98",
];

/// A `0x`-prefixed 32-byte hex hash.
pub fn random_hash(rng: &mut impl Rng) -> String {
    let bytes: [u8; 32] = rng.gen();
    format!("0x{}", hex::encode(bytes))
}

/// `count` transfers with uniformly random block numbers in
/// `block_min..=block_max` and addresses taken round-robin from `TEST_ADDRESSES`.
pub fn random_transfers(
    rng: &mut impl Rng,
    count: usize,
    block_min: u64,
    block_max: u64,
    base_time: i64,
) -> Vec<Transfer> {
    (0..count)
        .map(|i| Transfer {
            from: TEST_ADDRESSES[i % TEST_ADDRESSES.len()].to_string(),
            to: TEST_ADDRESSES[(i + 1) % TEST_ADDRESSES.len()].to_string(),
            block_number: rng.gen_range(block_min..=block_max),
            transaction_hash: random_hash(rng),
            block_hash: random_hash(rng),
            tx_block_index: (i % 100) as u32,
            timestamp: base_time + i as i64,
        })
        .collect()
}

/// `total` transfers packed into consecutive blocks of `per_block` starting at
/// `start_block`. Transfers in one block share its hash and are numbered from 0.
pub fn block_transfers(
    rng: &mut impl Rng,
    total: usize,
    per_block: usize,
    start_block: u64,
    base_time: i64,
) -> Vec<Transfer> {
    // A zero block size degenerates to one transfer per block.
    let per_block = per_block.max(1);
    let mut transfers = Vec::with_capacity(total);
    let mut block_number = start_block;
    let mut block_hash = random_hash(rng);
    let mut in_block = 0;

    for i in 0..total {
        if in_block >= per_block {
            block_number += 1;
            block_hash = random_hash(rng);
            in_block = 0;
        }
        transfers.push(Transfer {
            from: TEST_ADDRESSES[i % TEST_ADDRESSES.len()].to_string(),
            to: TEST_ADDRESSES[(i + 1) % TEST_ADDRESSES.len()].to_string(),
            block_number,
            transaction_hash: random_hash(rng),
            block_hash: block_hash.clone(),
            tx_block_index: in_block as u32,
            timestamp: base_time + i as i64,
        });
        in_block += 1;
    }
    transfers
}

/// Previously generated transfers that queries are drawn from.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    transfers: Vec<Transfer>,
}

impl Corpus {
    pub fn new(transfers: Vec<Transfer>) -> Self {
        Self { transfers }
    }

    pub fn transfers(&self) -> &[Transfer] {
        &self.transfers
    }

    pub fn len(&self) -> usize {
        self.transfers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }

    /// Parameter for the `i`th query of `category`.
    ///
    /// Hash and block queries walk the corpus in order; address queries walk
    /// `TEST_ADDRESSES`. `None` when the category needs transfers and the
    /// corpus has none.
    pub fn lookup(&self, category: Category, i: usize) -> Option<Lookup> {
        let address = TEST_ADDRESSES[i % TEST_ADDRESSES.len()].to_string();
        match category {
            Category::From => Some(Lookup::From(address)),
            Category::To => Some(Lookup::To(address)),
            Category::Hash | Category::Block if self.transfers.is_empty() => None,
            Category::Hash => Some(Lookup::Hash(
                self.transfers[i % self.transfers.len()].transaction_hash.clone(),
            )),
            Category::Block => Some(Lookup::Block(
                self.transfers[i % self.transfers.len()].block_number,
            )),
        }
    }

    /// Runs of consecutive transfers sharing a block number.
    pub fn blocks(&self) -> impl Iterator<Item = &[Transfer]> {
        self.transfers
            .chunk_by(|a, b| a.block_number == b.block_number)
    }

    /// Number of blocks spanned from the first to the last transfer.
    pub fn block_span(&self) -> u64 {
        match (self.transfers.first(), self.transfers.last()) {
            (Some(first), Some(last)) => last.block_number.abs_diff(first.block_number) + 1,
            _ => 0,
        }
    }
}
