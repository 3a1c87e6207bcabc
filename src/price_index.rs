// 💲 Price Index - unbalanced binary search tree keyed by price
//
// Secondary index over the catalog. Nodes hold handles, never records.
// Ties route right; among equal prices the arrival sequence decides, so a
// rebuild reproduces the order the records originally arrived in.
// There is no node deletion: the catalog rebuilds the index instead.

use crate::catalog::VehicleId;

/// What the index needs to know about one record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceEntry {
    pub vehicle: VehicleId,
    pub price: f64,
    /// Monotonic sequence number assigned when the record joined the catalog
    pub arrival: u64,
}

#[derive(Debug, Clone)]
struct TreeNode {
    entry: PriceEntry,
    left: Option<usize>,
    right: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct PriceIndex {
    nodes: Vec<TreeNode>,
    root: Option<usize>,
}

fn goes_left(new: &PriceEntry, existing: &PriceEntry) -> bool {
    new.price < existing.price || (new.price == existing.price && new.arrival < existing.arrival)
}

impl PriceIndex {
    pub fn new() -> Self {
        PriceIndex {
            nodes: Vec::new(),
            root: None,
        }
    }

    pub fn insert(&mut self, entry: PriceEntry) {
        let new_index = self.nodes.len();
        self.nodes.push(TreeNode {
            entry,
            left: None,
            right: None,
        });

        let Some(mut at) = self.root else {
            self.root = Some(new_index);
            return;
        };

        loop {
            let node = &mut self.nodes[at];
            let slot = if goes_left(&entry, &node.entry) {
                &mut node.left
            } else {
                &mut node.right
            };

            match *slot {
                Some(child) => at = child,
                None => {
                    *slot = Some(new_index);
                    return;
                }
            }
        }
    }

    /// Replace the whole index with `entries`
    pub fn rebuild<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = PriceEntry>,
    {
        self.clear();
        for entry in entries {
            self.insert(entry);
        }
    }

    /// Lowest price first
    pub fn ascending(&self) -> impl Iterator<Item = VehicleId> + '_ {
        self.walk(false).map(|entry| entry.vehicle)
    }

    /// Highest price first
    pub fn descending(&self) -> impl Iterator<Item = VehicleId> + '_ {
        self.walk(true).map(|entry| entry.vehicle)
    }

    /// Entries in ascending key order
    pub fn entries(&self) -> impl Iterator<Item = &PriceEntry> + '_ {
        self.walk(false)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    /// Number of nodes on the longest root-to-leaf path
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut stack: Vec<(usize, usize)> = self.root.map(|root| (root, 1)).into_iter().collect();

        while let Some((at, depth)) = stack.pop() {
            height = height.max(depth);
            let node = &self.nodes[at];
            stack.extend(node.left.map(|child| (child, depth + 1)));
            stack.extend(node.right.map(|child| (child, depth + 1)));
        }

        height
    }

    /// True when an in-order walk visits keys in non-decreasing order
    pub fn is_ordered(&self) -> bool {
        let keys: Vec<&PriceEntry> = self.walk(false).collect();
        keys.windows(2).all(|pair| !goes_left(pair[1], pair[0]))
    }

    fn walk(&self, reverse: bool) -> InOrder<'_> {
        InOrder {
            nodes: &self.nodes,
            stack: Vec::new(),
            cursor: self.root,
            reverse,
        }
    }
}

/// In-order walk with an explicit stack; depth is bounded by the heap,
/// not the call stack, so a degenerate chain is safe to traverse.
struct InOrder<'a> {
    nodes: &'a [TreeNode],
    stack: Vec<usize>,
    cursor: Option<usize>,
    reverse: bool,
}

impl<'a> Iterator for InOrder<'a> {
    type Item = &'a PriceEntry;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(at) = self.cursor {
            self.stack.push(at);
            let node = &self.nodes[at];
            self.cursor = if self.reverse { node.right } else { node.left };
        }

        let at = self.stack.pop()?;
        let node = &self.nodes[at];
        self.cursor = if self.reverse { node.left } else { node.right };
        Some(&node.entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;

    fn entries(prices: &[f64]) -> Vec<PriceEntry> {
        let mut arena = Arena::new();
        prices
            .iter()
            .enumerate()
            .map(|(i, price)| PriceEntry {
                vehicle: arena.insert(()),
                price: *price,
                arrival: i as u64,
            })
            .collect()
    }

    fn index_of(entries: &[PriceEntry]) -> PriceIndex {
        let mut index = PriceIndex::new();
        for entry in entries {
            index.insert(*entry);
        }
        index
    }

    #[test]
    fn test_ascending_and_descending() {
        let entries = entries(&[32000.0, 25000.0, 40000.0, 18000.0, 27500.0]);
        let index = index_of(&entries);

        let ascending: Vec<_> = index.ascending().collect();
        let expected: Vec<_> = [3, 1, 4, 0, 2].iter().map(|i| entries[*i].vehicle).collect();
        assert_eq!(ascending, expected);

        let mut descending: Vec<_> = index.descending().collect();
        descending.reverse();
        assert_eq!(descending, ascending);
        assert_eq!(index.len(), 5);
        assert!(index.is_ordered());
    }

    #[test]
    fn test_ties_route_right_in_arrival_order() {
        let entries = entries(&[100.0, 100.0, 50.0, 100.0]);
        let index = index_of(&entries);

        let ascending: Vec<_> = index.ascending().collect();
        let expected: Vec<_> = [2, 0, 1, 3].iter().map(|i| entries[*i].vehicle).collect();
        assert_eq!(ascending, expected);
    }

    #[test]
    fn test_rebuild_is_independent_of_input_order() {
        let entries = entries(&[10.0, 10.0, 5.0, 20.0, 10.0]);
        let original = index_of(&entries);

        let mut shuffled = entries.clone();
        shuffled.reverse();
        let mut rebuilt = PriceIndex::new();
        rebuilt.rebuild(shuffled);

        assert_eq!(
            original.ascending().collect::<Vec<_>>(),
            rebuilt.ascending().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_empty_index() {
        let index = PriceIndex::new();
        assert!(index.is_empty());
        assert_eq!(index.ascending().count(), 0);
        assert_eq!(index.descending().count(), 0);
        assert_eq!(index.height(), 0);
        assert!(index.is_ordered());
    }

    #[test]
    fn test_sorted_input_degrades_to_chain_without_overflow() {
        let prices: Vec<f64> = (0..10_000).map(f64::from).collect();
        let index = index_of(&entries(&prices));

        assert_eq!(index.height(), 10_000);
        assert_eq!(index.ascending().count(), 10_000);
        assert_eq!(index.descending().count(), 10_000);
    }

    #[test]
    fn test_height_of_balanced_input() {
        let index = index_of(&entries(&[4.0, 2.0, 6.0, 1.0, 3.0, 5.0, 7.0]));
        assert_eq!(index.height(), 3);
    }

    #[test]
    fn test_clear() {
        let mut index = index_of(&entries(&[1.0, 2.0]));
        index.clear();
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
    }
}
