//! RAII in-flight markers
//!
//! A guard marks an operation as running for as long as it lives, so the
//! marker is cleared on every exit path, including errors and a dropped
//! future.

use crate::graph::NodeId;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// Marks one node as being expanded
pub struct ExpansionGuard<'a> {
    in_flight: &'a DashMap<NodeId, ()>,
    node_id: NodeId,
}

impl<'a> ExpansionGuard<'a> {
    /// `None` when an expansion of `node_id` is already running
    pub fn acquire(in_flight: &'a DashMap<NodeId, ()>, node_id: &NodeId) -> Option<Self> {
        match in_flight.entry(node_id.clone()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                slot.insert(());
                Some(Self {
                    in_flight,
                    node_id: node_id.clone(),
                })
            }
        }
    }
}

impl Drop for ExpansionGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.remove(&self.node_id);
    }
}

/// Marks a regeneration as running
pub struct RegenerationGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> RegenerationGuard<'a> {
    /// `None` when a regeneration is already running
    pub fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for RegenerationGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
