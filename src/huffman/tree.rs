use std::fmt;

use super::{
    placeholder_symbol, Frequency, FrequencyTable, NodeIndex, Symbol, ALPHABET_SIZE,
};
use crate::{error::Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Leaf {
        symbol: Symbol,
    },
    /// Synthetic second leaf of a tree built from a single symbol.
    Placeholder {
        symbol: Symbol,
    },
    Inner {
        left: Option<NodeIndex>,
        right: Option<NodeIndex>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    pub frequency: Frequency,
    pub kind: NodeKind,
}

impl Node {
    pub fn leaf(symbol: Symbol, frequency: Frequency) -> Self {
        Self {
            frequency,
            kind: NodeKind::Leaf { symbol },
        }
    }

    pub fn inner(left: NodeIndex, right: NodeIndex, frequency: Frequency) -> Self {
        Self {
            frequency,
            kind: NodeKind::Inner {
                left: Some(left),
                right: Some(right),
            },
        }
    }
}

/// Binary merge tree stored as an arena. Nodes reference their children by
/// index, the root is usually the last node pushed.
#[derive(Debug, Clone)]
pub struct HuffmanTree {
    nodes: Vec<Node>,
    root_index: NodeIndex,
}

/// Owned recursive view of a tree, independent of arena layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeShape {
    Leaf(Symbol),
    Inner(Box<TreeShape>, Box<TreeShape>),
}

impl TreeShape {
    pub fn leaf(symbol: Symbol) -> Self {
        Self::Leaf(symbol)
    }

    pub fn inner(left: TreeShape, right: TreeShape) -> Self {
        Self::Inner(Box::new(left), Box::new(right))
    }
}

#[derive(Clone, Copy)]
struct WorkItem {
    node: NodeIndex,
    weight: Frequency,
}

/// Removes and returns the first item of minimal weight.
fn take_smallest(work: &mut Vec<WorkItem>) -> Option<WorkItem> {
    let position = work
        .iter()
        .enumerate()
        .min_by_key(|(_, item)| item.weight)
        .map(|(position, _)| position)?;
    Some(work.remove(position))
}

/// Stable two pass selection: ties are resolved in favour of the item that
/// comes first in the work list, on both passes.
fn take_two_smallest(work: &mut Vec<WorkItem>) -> Option<(WorkItem, WorkItem)> {
    if work.len() < 2 {
        return None;
    }
    let smallest = take_smallest(work)?;
    let second_smallest = take_smallest(work)?;
    Some((smallest, second_smallest))
}

/// Marks nodes as seen while walking a tree, so that shared or cyclic
/// references are reported instead of followed.
pub(crate) struct VisitGuard {
    visited: Vec<bool>,
}

impl VisitGuard {
    pub(crate) fn new(tree: &HuffmanTree) -> Self {
        Self {
            visited: vec![false; tree.nodes.len()],
        }
    }

    pub(crate) fn enter(&mut self, index: NodeIndex) -> Result<()> {
        match self.visited.get_mut(index) {
            None => Err(Error::NodeIndexOutOfBounds(index)),
            Some(true) => Err(Error::CyclicNodeReference(index)),
            Some(seen) => {
                *seen = true;
                Ok(())
            }
        }
    }
}

pub fn build_tree(frequencies: &FrequencyTable) -> Result<HuffmanTree> {
    HuffmanTree::new(frequencies)
}

impl HuffmanTree {
    pub fn new(frequencies: &FrequencyTable) -> Result<HuffmanTree> {
        if frequencies.is_empty() {
            return Err(Error::EmptyFrequencyTable);
        }
        let mut tree = HuffmanTree {
            nodes: Vec::with_capacity(frequencies.len() * 2),
            root_index: 0,
        };
        let mut work: Vec<WorkItem> = frequencies
            .iter()
            .map(|entry| WorkItem {
                node: tree.push_node(Node::leaf(entry.symbol, entry.frequency)),
                weight: entry.frequency,
            })
            .collect();

        if let ([single], Some(entry)) = (work.as_slice(), frequencies.iter().next()) {
            tree.root_index = tree.complete_single_symbol(*single, entry.symbol);
            return Ok(tree);
        }

        let mut merges = 0;
        while let Some((smallest, second_smallest)) = take_two_smallest(&mut work) {
            let weight = smallest
                .weight
                .checked_add(second_smallest.weight)
                .ok_or(Error::FrequencyOverflow)?;
            let node = tree.push_node(Node::inner(smallest.node, second_smallest.node, weight));
            log::trace!(
                "merged node {} (f:{}) and node {} (f:{}) into node {}",
                smallest.node,
                smallest.weight,
                second_smallest.node,
                second_smallest.weight,
                node
            );
            work.push(WorkItem { node, weight });
            merges += 1;
        }
        tree.root_index = work.pop().ok_or(Error::EmptyFrequencyTable)?.node;
        log::debug!(
            "built tree for {} symbols with {} merges",
            frequencies.len(),
            merges
        );
        Ok(tree)
    }

    /// Assembles a tree from raw nodes without checking them. Use
    /// [`HuffmanTree::validate`] before relying on its structure.
    pub fn from_nodes(nodes: Vec<Node>, root_index: NodeIndex) -> HuffmanTree {
        HuffmanTree { nodes, root_index }
    }

    fn push_node(&mut self, node: Node) -> NodeIndex {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn complete_single_symbol(&mut self, item: WorkItem, symbol: Symbol) -> NodeIndex {
        let placeholder = self.push_node(Node {
            frequency: 0,
            kind: NodeKind::Placeholder {
                symbol: placeholder_symbol(symbol),
            },
        });
        log::debug!(
            "single symbol {} completed with placeholder {}",
            symbol,
            placeholder_symbol(symbol)
        );
        self.push_node(Node::inner(item.node, placeholder, item.weight))
    }

    pub fn root_index(&self) -> NodeIndex {
        self.root_index
    }

    pub fn node(&self, index: NodeIndex) -> Result<&Node> {
        self.nodes
            .get(index)
            .ok_or(Error::NodeIndexOutOfBounds(index))
    }

    /// Both children of an inner node, `None` for leaves.
    pub(crate) fn children(&self, index: NodeIndex) -> Result<Option<(NodeIndex, NodeIndex)>> {
        match self.node(index)?.kind {
            NodeKind::Leaf { .. } | NodeKind::Placeholder { .. } => Ok(None),
            NodeKind::Inner {
                left: Some(left),
                right: Some(right),
            } => Ok(Some((left, right))),
            NodeKind::Inner { .. } => Err(Error::MissingChildNode(index)),
        }
    }

    /// Total weight of the tree.
    pub fn frequency(&self) -> Frequency {
        self.nodes
            .get(self.root_index)
            .map_or(0, |node| node.frequency)
    }

    /// Number of leaves reachable from the root, placeholder included.
    pub fn leaf_count(&self) -> Result<usize> {
        let leaves = self
            .validated_nodes()?
            .into_iter()
            .filter(|&index| !matches!(self.nodes[index].kind, NodeKind::Inner { .. }))
            .count();
        Ok(leaves)
    }

    /// Checks that the tree is full, acyclic, within bounds and that no
    /// symbol is stored twice.
    pub fn validate(&self) -> Result<()> {
        self.validated_nodes().map(|_| ())
    }

    // Iterative pre-order walk, bounded by the distinct leaf symbols, so
    // malformed arenas of any depth fail here before a recursive walk starts.
    fn validated_nodes(&self) -> Result<Vec<NodeIndex>> {
        if self.children(self.root_index)?.is_none() {
            return Err(Error::RootIsLeaf);
        }
        let mut guard = VisitGuard::new(self);
        let mut seen_symbols = [false; ALPHABET_SIZE];
        let mut reached = Vec::new();
        let mut stack = vec![self.root_index];
        while let Some(index) = stack.pop() {
            guard.enter(index)?;
            match self.node(index)?.kind {
                NodeKind::Leaf { symbol } | NodeKind::Placeholder { symbol } => {
                    if seen_symbols[symbol as usize] {
                        return Err(Error::DuplicateLeafSymbol(symbol));
                    }
                    seen_symbols[symbol as usize] = true;
                }
                NodeKind::Inner { .. } => {
                    if let Some((left, right)) = self.children(index)? {
                        stack.push(right);
                        stack.push(left);
                    }
                }
            }
            reached.push(index);
        }
        Ok(reached)
    }

    pub fn shape(&self) -> Result<TreeShape> {
        self.validate()?;
        let mut guard = VisitGuard::new(self);
        self.shape_under(self.root_index, &mut guard)
    }

    fn shape_under(&self, index: NodeIndex, guard: &mut VisitGuard) -> Result<TreeShape> {
        guard.enter(index)?;
        match self.node(index)?.kind {
            NodeKind::Leaf { symbol } | NodeKind::Placeholder { symbol } => {
                Ok(TreeShape::leaf(symbol))
            }
            NodeKind::Inner { .. } => match self.children(index)? {
                Some((left, right)) => Ok(TreeShape::inner(
                    self.shape_under(left, guard)?,
                    self.shape_under(right, guard)?,
                )),
                None => Err(Error::MissingChildNode(index)),
            },
        }
    }

    /// Decodes a string of '0' and '1' by walking from the root to a leaf
    /// once per symbol.
    pub fn decode(&self, bits: &str) -> Result<Vec<Symbol>> {
        if self.children(self.root_index)?.is_none() {
            return Err(Error::RootIsLeaf);
        }
        let mut symbols = Vec::new();
        let mut current_index = self.root_index;
        for bit in bits.chars() {
            let (left, right) = self
                .children(current_index)?
                .ok_or(Error::MissingChildNode(current_index))?;
            current_index = match bit {
                '0' => left,
                '1' => right,
                other => return Err(Error::InvalidCodeBit(other)),
            };
            match self.node(current_index)?.kind {
                NodeKind::Leaf { symbol } | NodeKind::Placeholder { symbol } => {
                    symbols.push(symbol);
                    current_index = self.root_index;
                }
                NodeKind::Inner { .. } => {}
            }
        }
        if current_index != self.root_index {
            return Err(Error::IncompleteCode);
        }
        Ok(symbols)
    }
}

const BOX_DRAWINGS_DOUBLE_HORIZONTAL: &str = "═";
const SPACE: &str = " ";

struct Drawing {
    lines: Vec<String>,
    width: usize,
    anchor: usize,
}

impl Drawing {
    fn label(text: String) -> Self {
        let width = text.chars().count();
        Drawing {
            lines: vec![text],
            width,
            anchor: width / 2,
        }
    }

    fn join(left: Drawing, right: Drawing) -> Self {
        let mut lines = vec![
            format!("{}•{}", SPACE.repeat(left.width), SPACE.repeat(right.width)),
            format!("{}║{}", SPACE.repeat(left.width), SPACE.repeat(right.width)),
            format!(
                "{}╔{}╩{}╗{}",
                SPACE.repeat(left.anchor),
                BOX_DRAWINGS_DOUBLE_HORIZONTAL.repeat(left.width - left.anchor - 1),
                BOX_DRAWINGS_DOUBLE_HORIZONTAL.repeat(right.anchor),
                SPACE.repeat(right.width - right.anchor - 1)
            ),
        ];
        let rows = left.lines.len().max(right.lines.len());
        for row in 0..rows {
            let left_line = left
                .lines
                .get(row)
                .cloned()
                .unwrap_or_else(|| SPACE.repeat(left.width));
            let right_line = right
                .lines
                .get(row)
                .cloned()
                .unwrap_or_else(|| SPACE.repeat(right.width));
            lines.push(format!("{} {}", left_line, right_line));
        }
        Drawing {
            lines,
            width: left.width + 1 + right.width,
            anchor: left.width,
        }
    }
}

impl HuffmanTree {
    // only called on validated trees
    fn draw(&self, index: NodeIndex) -> Drawing {
        let Some(node) = self.nodes.get(index) else {
            return Drawing::label("(?)".to_string());
        };
        match node.kind {
            NodeKind::Leaf { symbol } => {
                Drawing::label(format!("(s:{},f:{})", symbol, node.frequency))
            }
            NodeKind::Placeholder { symbol } => Drawing::label(format!("(s:{},*)", symbol)),
            NodeKind::Inner {
                left: Some(left),
                right: Some(right),
            } => Drawing::join(self.draw(left), self.draw(right)),
            NodeKind::Inner { .. } => Drawing::label("(?)".to_string()),
        }
    }
}

impl fmt::Display for HuffmanTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Err(error) = self.validate() {
            return writeln!(f, "<malformed tree: {}>", error);
        }
        for line in self.draw(self.root_index).lines {
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::{build_tree, HuffmanTree, Node, NodeKind, TreeShape};
    use crate::error::{Error, ErrorKind};
    use crate::huffman::{FrequencyTable, NodeIndex, Symbol};

    fn table(pairs: &[(Symbol, usize)]) -> FrequencyTable {
        FrequencyTable::try_from(pairs).expect("test frequencies must be valid")
    }

    fn leaf(symbol: Symbol) -> TreeShape {
        TreeShape::leaf(symbol)
    }

    fn inner(left: TreeShape, right: TreeShape) -> TreeShape {
        TreeShape::inner(left, right)
    }

    fn leaf_symbols(shape: &TreeShape, symbols: &mut Vec<Symbol>) {
        match shape {
            TreeShape::Leaf(symbol) => symbols.push(*symbol),
            TreeShape::Inner(left, right) => {
                leaf_symbols(left, symbols);
                leaf_symbols(right, symbols);
            }
        }
    }

    const SYMBOLS_AND_FREQUENCIES: &[(Symbol, usize)] =
        &[(1, 17), (2, 3), (3, 12), (4, 3), (5, 18), (6, 12), (7, 13)];

    #[test]
    fn test_two_symbols_lower_weight_goes_left() {
        let tree = build_tree(&table(&[(2, 6), (3, 4)])).unwrap();
        assert_eq!(tree.shape().unwrap(), inner(leaf(3), leaf(2)));
    }

    #[test]
    fn test_two_symbols_equal_weight_keeps_input_order() {
        let tree = build_tree(&table(&[(9, 5), (1, 5)])).unwrap();
        assert_eq!(tree.shape().unwrap(), inner(leaf(9), leaf(1)));
    }

    #[test]
    fn test_three_symbols_merge_two_lightest_first() {
        let tree = build_tree(&table(&[(2, 6), (3, 4), (7, 5)])).unwrap();
        assert_eq!(
            tree.shape().unwrap(),
            inner(leaf(2), inner(leaf(3), leaf(7)))
        );
        assert_eq!(tree.frequency(), 15);
    }

    #[test]
    fn test_ties_are_resolved_by_first_occurrence() {
        let tree = build_tree(&table(&[(1, 1), (2, 1), (3, 1)])).unwrap();
        assert_eq!(
            tree.shape().unwrap(),
            inner(leaf(3), inner(leaf(1), leaf(2)))
        );
    }

    #[test]
    fn test_single_symbol_gets_placeholder_sibling() {
        for symbol in [0, 17, 254, 255] {
            let tree = build_tree(&table(&[(symbol, 6)])).unwrap();
            let expected_placeholder = ((symbol as usize + 1) % 256) as Symbol;
            assert_eq!(
                tree.shape().unwrap(),
                inner(leaf(symbol), leaf(expected_placeholder)),
                "Unexpected tree for single symbol {}",
                symbol
            );
            assert_eq!(tree.leaf_count().unwrap(), 2);
        }
    }

    #[test]
    fn test_leaf_count_matches_number_of_symbols() {
        let tree = build_tree(&table(SYMBOLS_AND_FREQUENCIES)).unwrap();
        assert_eq!(tree.leaf_count().unwrap(), SYMBOLS_AND_FREQUENCIES.len());
        let mut symbols = Vec::new();
        leaf_symbols(&tree.shape().unwrap(), &mut symbols);
        symbols.sort();
        assert_eq!(symbols, vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_every_inner_node_has_two_children() {
        let frequencies = FrequencyTable::count(b"the quick brown fox jumps over the lazy dog");
        let tree = build_tree(&frequencies).unwrap();
        tree.validate().expect("built tree must be valid");
        for index in 0..tree.nodes.len() {
            if let NodeKind::Inner { left, right } = tree.nodes[index].kind {
                assert!(
                    left.is_some() && right.is_some(),
                    "Inner node {} is missing a child",
                    index
                );
            }
        }
    }

    #[test]
    fn test_inner_frequency_is_sum_of_children() {
        let tree = build_tree(&table(SYMBOLS_AND_FREQUENCIES)).unwrap();
        for (index, node) in tree.nodes.iter().enumerate() {
            if let NodeKind::Inner {
                left: Some(left),
                right: Some(right),
            } = node.kind
            {
                assert_eq!(
                    node.frequency,
                    tree.nodes[left].frequency + tree.nodes[right].frequency,
                    "Frequency of inner node {} does not match its children",
                    index
                );
            }
        }
        assert_eq!(tree.frequency(), 78);
    }

    #[test]
    fn test_building_twice_yields_identical_trees() {
        let first = build_tree(&table(SYMBOLS_AND_FREQUENCIES)).unwrap();
        let second = build_tree(&table(SYMBOLS_AND_FREQUENCIES)).unwrap();
        assert_eq!(first.shape().unwrap(), second.shape().unwrap());
    }

    #[test]
    fn test_empty_table_is_rejected() {
        let result = HuffmanTree::new(&FrequencyTable::new());
        assert!(matches!(result, Err(Error::EmptyFrequencyTable)));
    }

    #[test]
    fn test_weight_overflow_is_rejected() {
        let result = build_tree(&table(&[(1, usize::MAX), (2, 1)]));
        match result {
            Err(error) => {
                assert!(matches!(error, Error::FrequencyOverflow));
                assert_eq!(error.kind(), ErrorKind::InvalidInput);
            }
            Ok(_) => panic!("Overflowing weights not detected"),
        }
    }

    fn single_child_tree() -> HuffmanTree {
        HuffmanTree::from_nodes(
            vec![
                Node::leaf(1, 1),
                Node {
                    frequency: 1,
                    kind: NodeKind::Inner {
                        left: Some(0),
                        right: None,
                    },
                },
            ],
            1,
        )
    }

    #[test]
    fn test_validate_detects_missing_child() {
        let result = single_child_tree().validate();
        assert!(matches!(result, Err(Error::MissingChildNode(1))));
    }

    #[test]
    fn test_validate_detects_cycle() {
        let root: NodeIndex = 1;
        let tree = HuffmanTree::from_nodes(vec![Node::leaf(1, 1), Node::inner(0, root, 1)], root);
        assert!(matches!(
            tree.validate(),
            Err(Error::CyclicNodeReference(1))
        ));
    }

    #[test]
    fn test_validate_detects_dangling_index() {
        let tree = HuffmanTree::from_nodes(vec![Node::leaf(1, 1), Node::inner(0, 5, 1)], 1);
        assert!(matches!(
            tree.validate(),
            Err(Error::NodeIndexOutOfBounds(5))
        ));
    }

    #[test]
    fn test_validate_detects_duplicate_symbol() {
        let tree = HuffmanTree::from_nodes(
            vec![Node::leaf(4, 1), Node::leaf(4, 2), Node::inner(0, 1, 3)],
            2,
        );
        assert!(matches!(
            tree.validate(),
            Err(Error::DuplicateLeafSymbol(4))
        ));
    }

    #[test]
    fn test_validate_rejects_leaf_root() {
        let tree = HuffmanTree::from_nodes(vec![Node::leaf(4, 1)], 0);
        assert!(matches!(tree.validate(), Err(Error::RootIsLeaf)));
    }

    #[test]
    fn test_leaf_count_ignores_unreachable_nodes() {
        let tree = HuffmanTree::from_nodes(
            vec![
                Node::leaf(1, 1),
                Node::leaf(2, 1),
                Node::leaf(3, 9),
                Node::inner(0, 1, 2),
            ],
            3,
        );
        assert_eq!(tree.leaf_count().unwrap(), 2);
    }

    /// Left leaning chain of `depth` inner nodes, every right child a fresh
    /// leaf holding the same symbol.
    fn deep_chain(depth: usize) -> HuffmanTree {
        let mut nodes = vec![Node::leaf(0, 1)];
        for _ in 0..depth {
            let below = nodes.len() - 1;
            nodes.push(Node::leaf(0, 1));
            let right = nodes.len() - 1;
            nodes.push(Node::inner(below, right, 2));
        }
        let root = nodes.len() - 1;
        HuffmanTree::from_nodes(nodes, root)
    }

    #[test]
    fn test_shape_of_deep_malformed_chain_fails_without_overflow() {
        let tree = deep_chain(200_000);
        match tree.shape() {
            Err(error) => assert_eq!(error.kind(), ErrorKind::StructuralInvariantViolation),
            Ok(_) => panic!("Chain with repeated symbol accepted"),
        }
        assert!(matches!(
            tree.leaf_count(),
            Err(Error::DuplicateLeafSymbol(0))
        ));
    }

    #[test]
    fn test_decode_walks_root_to_leaf() {
        let tree = build_tree(&table(&[(2, 6), (3, 4), (7, 5)])).unwrap();
        // 2 -> 0, 3 -> 10, 7 -> 11
        let symbols = tree.decode("0101100").unwrap();
        assert_eq!(symbols, vec![2, 3, 7, 2, 2]);
    }

    #[test]
    fn test_decode_rejects_truncated_code() {
        let tree = build_tree(&table(&[(2, 6), (3, 4), (7, 5)])).unwrap();
        assert!(matches!(tree.decode("01"), Err(Error::IncompleteCode)));
        assert!(matches!(tree.decode("0x"), Err(Error::InvalidCodeBit('x'))));
    }

    #[test]
    fn test_display_draws_every_leaf() {
        let tree = build_tree(&table(&[(2, 6), (3, 4), (7, 5)])).unwrap();
        let drawing = tree.to_string();
        for label in ["(s:2,f:6)", "(s:3,f:4)", "(s:7,f:5)", "╩"] {
            assert!(
                drawing.contains(label),
                "Drawing does not contain {}:\n{}",
                label,
                drawing
            );
        }
    }

    #[test]
    fn test_display_of_malformed_tree_does_not_panic() {
        let drawing = single_child_tree().to_string();
        assert!(drawing.starts_with("<malformed tree"));
    }
}
