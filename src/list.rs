// 📋 Category List - singly-linked sequence ordered by category
//
// Nodes live in the list's own arena and link to each other by handle.
// Order invariant: categories are non-decreasing from head to tail, and
// records of one category appear in arrival order.

use crate::arena::{Arena, Handle};
use crate::catalog::VehicleId;
use crate::vehicle::{Category, Vehicle};

#[derive(Debug, Clone)]
struct ListNode {
    vehicle: VehicleId,
    category: Category,
    next: Option<Handle>,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryList {
    nodes: Arena<ListNode>,
    head: Option<Handle>,
}

impl CategoryList {
    pub fn new() -> Self {
        CategoryList {
            nodes: Arena::new(),
            head: None,
        }
    }

    /// Insert after the last node whose category is <= `category`.
    pub fn insert_by_category(&mut self, vehicle: VehicleId, category: Category) {
        let mut prev: Option<Handle> = None;
        let mut cursor = self.head;

        while let Some(at) = cursor {
            let Some(node) = self.nodes.get(at) else { break };
            if node.category > category {
                break;
            }
            prev = Some(at);
            cursor = node.next;
        }

        let new_node = self.nodes.insert(ListNode {
            vehicle,
            category,
            next: cursor,
        });

        match prev.and_then(|p| self.nodes.get_mut(p)) {
            Some(prev_node) => prev_node.next = Some(new_node),
            None => self.head = Some(new_node),
        }
    }

    /// Remove the node holding `vehicle`. Returns false if it is not listed.
    pub fn remove(&mut self, vehicle: VehicleId) -> bool {
        let mut prev: Option<Handle> = None;
        let mut cursor = self.head;

        while let Some(at) = cursor {
            let Some(node) = self.nodes.get(at) else { return false };
            let next = node.next;

            if node.vehicle == vehicle {
                match prev.and_then(|p| self.nodes.get_mut(p)) {
                    Some(prev_node) => prev_node.next = next,
                    None => self.head = next,
                }
                self.nodes.remove(at);
                return true;
            }

            prev = Some(at);
            cursor = next;
        }

        false
    }

    /// First vehicle (in list order) whose make and model match exactly.
    ///
    /// `lookup` resolves a handle to the record it names.
    pub fn find_by_make_model<'v, F>(&self, lookup: F, make: &str, model: &str) -> Option<VehicleId>
    where
        F: Fn(VehicleId) -> Option<&'v Vehicle>,
    {
        self.iter()
            .find(|id| lookup(*id).is_some_and(|vehicle| vehicle.matches(make, model)))
    }

    pub fn contains(&self, vehicle: VehicleId) -> bool {
        self.iter().any(|id| id == vehicle)
    }

    /// Every vehicle in list order
    pub fn iter(&self) -> impl Iterator<Item = VehicleId> + '_ {
        self.nodes().map(|node| node.vehicle)
    }

    /// Vehicles of one category, in arrival order
    pub fn iter_category(&self, category: Category) -> impl Iterator<Item = VehicleId> + '_ {
        self.nodes()
            .skip_while(move |node| node.category < category)
            .take_while(move |node| node.category == category)
            .map(|node| node.vehicle)
    }

    /// Categories in list order, for checking the order invariant
    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.nodes().map(|node| node.category)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.head = None;
    }

    fn nodes(&self) -> Nodes<'_> {
        Nodes {
            list: self,
            cursor: self.head,
        }
    }
}

struct Nodes<'a> {
    list: &'a CategoryList,
    cursor: Option<Handle>,
}

impl<'a> Iterator for Nodes<'a> {
    type Item = &'a ListNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.list.nodes.get(self.cursor?)?;
        self.cursor = node.next;
        Some(node)
    }
}
