pub mod code;
pub mod frequency;
pub mod tree;

pub use code::{generate_codes, CodeTable};
pub use frequency::FrequencyTable;
pub use tree::{build_tree, HuffmanTree, Node, NodeKind, TreeShape};

pub type Symbol = u8;
pub type Frequency = usize;
pub type NodeIndex = usize;

/// Number of distinct symbols a tree can hold.
pub const ALPHABET_SIZE: usize = Symbol::MAX as usize + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolFrequency {
    pub symbol: Symbol,
    pub frequency: Frequency,
}

impl From<(Symbol, Frequency)> for SymbolFrequency {
    fn from(value: (Symbol, Frequency)) -> Self {
        Self {
            symbol: value.0,
            frequency: value.1,
        }
    }
}

/// Symbol standing in for the missing second leaf of a single symbol tree.
pub fn placeholder_symbol(symbol: Symbol) -> Symbol {
    ((symbol as usize + 1) % ALPHABET_SIZE) as Symbol
}
