//! Per-call record of which features enable which lookups.

/// A bit matrix with one row per lookup.
///
/// Each row holds an aggregate bit (set when anything enables the lookup), a bit for the
/// required feature of the language system, and one bit per caller supplied feature. The
/// backing storage grows geometrically and is never released, so a workspace reused across
/// layout calls stops allocating once it has seen the largest table.
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    bits: Vec<u32>,
    lookup_count: usize,
    feature_count: usize,
    row_words: usize,
}

const WORD_BITS: usize = 32;
const AGGREGATE_BIT: usize = 0;
const REQUIRED_BIT: usize = 1;
const FEATURE_BITS_START: usize = 2;

impl Workspace {
    pub fn new() -> Workspace {
        Workspace::default()
    }

    /// Clear the workspace and size it for `lookup_count` lookups and `feature_count` features.
    pub fn reset(&mut self, lookup_count: usize, feature_count: usize) {
        let row_bits = feature_count + FEATURE_BITS_START;
        let row_words = (row_bits + WORD_BITS - 1) / WORD_BITS;
        let required = lookup_count * row_words;
        if required > self.bits.len() {
            let new_len = required.max(self.bits.len() * 2);
            self.bits.resize(new_len, 0);
        }
        self.bits[..required].iter_mut().for_each(|word| *word = 0);
        self.lookup_count = lookup_count;
        self.feature_count = feature_count;
        self.row_words = row_words;
    }

    pub fn lookup_count(&self) -> usize {
        self.lookup_count
    }

    pub fn feature_count(&self) -> usize {
        self.feature_count
    }

    /// Number of words of backing storage currently held.
    pub fn storage_len(&self) -> usize {
        self.bits.len()
    }

    fn position(&self, lookup_index: usize, bit: usize) -> (usize, u32) {
        debug_assert!(lookup_index < self.lookup_count);
        let word = lookup_index * self.row_words + bit / WORD_BITS;
        (word, 1 << (bit % WORD_BITS))
    }

    fn set_bit(&mut self, lookup_index: usize, bit: usize) {
        let (word, mask) = self.position(lookup_index, bit);
        self.bits[word] |= mask;
    }

    fn bit(&self, lookup_index: usize, bit: usize) -> bool {
        let (word, mask) = self.position(lookup_index, bit);
        self.bits[word] & mask != 0
    }

    pub fn set_required(&mut self, lookup_index: usize) {
        self.set_bit(lookup_index, REQUIRED_BIT);
        self.set_bit(lookup_index, AGGREGATE_BIT);
    }

    pub fn set_feature(&mut self, lookup_index: usize, feature_index: usize) {
        debug_assert!(feature_index < self.feature_count);
        self.set_bit(lookup_index, FEATURE_BITS_START + feature_index);
        self.set_bit(lookup_index, AGGREGATE_BIT);
    }

    /// Whether the required feature or any feature enables the lookup.
    pub fn is_lookup_enabled(&self, lookup_index: usize) -> bool {
        self.bit(lookup_index, AGGREGATE_BIT)
    }

    pub fn is_required(&self, lookup_index: usize) -> bool {
        self.bit(lookup_index, REQUIRED_BIT)
    }

    pub fn is_feature_enabled(&self, lookup_index: usize, feature_index: usize) -> bool {
        feature_index < self.feature_count
            && self.bit(lookup_index, FEATURE_BITS_START + feature_index)
    }
}
