use std::fmt::Display;

use crate::huffman::{NodeIndex, Symbol};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    StructuralInvariantViolation,
    InvalidCode,
    Io,
}

#[derive(Debug)]
pub enum Error {
    EmptyFrequencyTable,
    NonPositiveFrequency(Symbol),
    SymbolOutOfRange(u32),
    DuplicateSymbol(Symbol),
    FrequencyOverflow,
    MissingChildNode(NodeIndex),
    NodeIndexOutOfBounds(NodeIndex),
    CyclicNodeReference(NodeIndex),
    RootIsLeaf,
    DuplicateLeafSymbol(Symbol),
    UnknownSymbol(Symbol),
    InvalidCodeBit(char),
    IncompleteCode,
    UnableToOpenInputFileForReading(String, std::io::Error),
    UnableToOpenOutputFileForWriting(String, std::io::Error),
    FailedToWriteReport(std::io::Error),
    WorkerDisconnected,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyFrequencyTable
            | Self::NonPositiveFrequency(_)
            | Self::SymbolOutOfRange(_)
            | Self::DuplicateSymbol(_)
            | Self::FrequencyOverflow => ErrorKind::InvalidInput,
            Self::MissingChildNode(_)
            | Self::NodeIndexOutOfBounds(_)
            | Self::CyclicNodeReference(_)
            | Self::RootIsLeaf
            | Self::DuplicateLeafSymbol(_) => ErrorKind::StructuralInvariantViolation,
            Self::UnknownSymbol(_) | Self::InvalidCodeBit(_) | Self::IncompleteCode => {
                ErrorKind::InvalidCode
            }
            Self::UnableToOpenInputFileForReading(_, _)
            | Self::UnableToOpenOutputFileForWriting(_, _)
            | Self::FailedToWriteReport(_)
            | Self::WorkerDisconnected => ErrorKind::Io,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyFrequencyTable => {
                write!(f, "Frequency table is empty, at least one symbol is required")
            }
            Self::NonPositiveFrequency(symbol) => {
                write!(f, "Frequency of symbol '{}' must be greater than 0", symbol)
            }
            Self::SymbolOutOfRange(symbol) => {
                write!(
                    f,
                    "Symbol '{}' is outside of the alphabet range 0..=255",
                    symbol
                )
            }
            Self::DuplicateSymbol(symbol) => {
                write!(f, "Symbol '{}' occurs more than once in frequency table", symbol)
            }
            Self::FrequencyOverflow => {
                write!(f, "Sum of frequencies exceeds the representable range")
            }
            Self::MissingChildNode(index) => {
                write!(f, "Inner node {} does not have two children", index)
            }
            Self::NodeIndexOutOfBounds(index) => {
                write!(f, "Node index {} points outside of the tree", index)
            }
            Self::CyclicNodeReference(index) => {
                write!(f, "Node {} is referenced more than once", index)
            }
            Self::RootIsLeaf => write!(f, "Root of the tree must not be a leaf"),
            Self::DuplicateLeafSymbol(symbol) => {
                write!(f, "Symbol '{}' is stored in more than one leaf", symbol)
            }
            Self::UnknownSymbol(symbol) => {
                write!(f, "Symbol '{}' not present in code table", symbol)
            }
            Self::InvalidCodeBit(bit) => {
                write!(f, "Code contains '{}', only '0' and '1' are allowed", bit)
            }
            Self::IncompleteCode => write!(f, "Code ends in the middle of a code word"),
            Self::UnableToOpenInputFileForReading(path, error) => {
                write!(
                    f,
                    "Unable to open input file '{}' for reading: {}",
                    path, error
                )
            }
            Self::UnableToOpenOutputFileForWriting(path, error) => {
                write!(
                    f,
                    "Unable to open output file '{}' for writing: {}",
                    path, error
                )
            }
            Self::FailedToWriteReport(error) => write!(f, "Failed to write report: {}", error),
            Self::WorkerDisconnected => {
                write!(f, "Worker thread terminated without delivering a result")
            }
        }
    }
}

impl std::error::Error for Error {}
