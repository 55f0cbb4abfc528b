use super::{Frequency, Symbol, SymbolFrequency, ALPHABET_SIZE};
use crate::{error::Error, Result};

/// Symbol frequencies in insertion order. Every symbol occurs at most once
/// and every frequency is positive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    entries: Vec<SymbolFrequency>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates raw pairs, keeping their order.
    pub fn try_from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (u32, Frequency)>,
    {
        let mut table = Self::new();
        for (symbol, frequency) in pairs {
            if symbol as usize >= ALPHABET_SIZE {
                return Err(Error::SymbolOutOfRange(symbol));
            }
            table.insert(symbol as Symbol, frequency)?;
        }
        Ok(table)
    }

    /// Counts the occurrences of every byte, ordered by symbol.
    pub fn count(bytes: &[u8]) -> Self {
        let mut counts = [Frequency::default(); ALPHABET_SIZE];
        for &byte in bytes {
            counts[byte as usize] += 1;
        }
        let entries = (0..=Symbol::MAX)
            .zip(counts)
            .filter(|&(_, frequency)| frequency > 0)
            .map(SymbolFrequency::from)
            .collect();
        Self { entries }
    }

    pub fn insert(&mut self, symbol: Symbol, frequency: Frequency) -> Result<()> {
        if frequency == 0 {
            return Err(Error::NonPositiveFrequency(symbol));
        }
        if self.get(symbol).is_some() {
            return Err(Error::DuplicateSymbol(symbol));
        }
        self.entries.push(SymbolFrequency { symbol, frequency });
        Ok(())
    }

    pub fn get(&self, symbol: Symbol) -> Option<Frequency> {
        self.entries
            .iter()
            .find(|entry| entry.symbol == symbol)
            .map(|entry| entry.frequency)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SymbolFrequency> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> Frequency {
        self.entries.iter().map(|entry| entry.frequency).sum()
    }
}

impl TryFrom<&[(Symbol, Frequency)]> for FrequencyTable {
    type Error = Error;

    fn try_from(value: &[(Symbol, Frequency)]) -> Result<Self> {
        Self::try_from_pairs(value.iter().map(|&(s, f)| (s as u32, f)))
    }
}
