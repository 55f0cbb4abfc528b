use std::collections::BTreeMap;

use super::tree::VisitGuard;
use super::{FrequencyTable, HuffmanTree, NodeIndex, NodeKind, Symbol};
use crate::{error::Error, Result};

const LEFT_BRANCH: char = '0';
const RIGHT_BRANCH: char = '1';

/// Code word of every real symbol in a tree, as a string of '0' and '1'.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeTable {
    codes: BTreeMap<Symbol, String>,
}

pub fn generate_codes(tree: &HuffmanTree) -> Result<CodeTable> {
    tree.validate()?;
    let root_index = tree.root_index();
    let mut table = CodeTable::default();
    let mut guard = VisitGuard::new(tree);
    let mut path = String::new();
    fill_table(&mut table, tree, root_index, &mut path, &mut guard)?;
    log::debug!("generated {} codes", table.len());
    Ok(table)
}

fn fill_table(
    table: &mut CodeTable,
    tree: &HuffmanTree,
    index: NodeIndex,
    path: &mut String,
    guard: &mut VisitGuard,
) -> Result<()> {
    guard.enter(index)?;
    match tree.node(index)?.kind {
        NodeKind::Leaf { symbol } => {
            if table.codes.insert(symbol, path.clone()).is_some() {
                return Err(Error::DuplicateLeafSymbol(symbol));
            }
        }
        NodeKind::Placeholder { symbol } => {
            log::trace!("skipping placeholder {} with code {}", symbol, path);
        }
        NodeKind::Inner { .. } => {
            let (left, right) = tree
                .children(index)?
                .ok_or(Error::MissingChildNode(index))?;
            path.push(LEFT_BRANCH);
            fill_table(table, tree, left, path, guard)?;
            path.pop();
            path.push(RIGHT_BRANCH);
            fill_table(table, tree, right, path, guard)?;
            path.pop();
        }
    }
    Ok(())
}

impl CodeTable {
    pub fn get(&self, symbol: Symbol) -> Option<&str> {
        self.codes.get(&symbol).map(String::as_str)
    }

    /// Entries ordered by symbol.
    pub fn iter(&self) -> impl Iterator<Item = (Symbol, &str)> {
        self.codes.iter().map(|(&symbol, code)| (symbol, code.as_str()))
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn encode(&self, symbols: &[Symbol]) -> Result<String> {
        let mut encoded = String::new();
        for &symbol in symbols {
            let code = self.get(symbol).ok_or(Error::UnknownSymbol(symbol))?;
            encoded.push_str(code);
        }
        Ok(encoded)
    }

    /// Number of bits needed to encode every symbol of `frequencies` as
    /// often as it occurs.
    pub fn encoded_length(&self, frequencies: &FrequencyTable) -> Result<usize> {
        frequencies.iter().try_fold(0usize, |bits, entry| {
            let code = self
                .get(entry.symbol)
                .ok_or(Error::UnknownSymbol(entry.symbol))?;
            code.len()
                .checked_mul(entry.frequency)
                .and_then(|length| bits.checked_add(length))
                .ok_or(Error::FrequencyOverflow)
        })
    }

    pub fn is_prefix_free(&self) -> bool {
        let codes: Vec<&str> = self.codes.values().map(String::as_str).collect();
        codes.iter().enumerate().all(|(i, a)| {
            codes
                .iter()
                .enumerate()
                .all(|(j, b)| i == j || !b.starts_with(a))
        })
    }
}
