//! Priority queue of participants by claim backlog (max-heap by unclaimed snapshots)

use priority_queue::PriorityQueue;
use std::collections::HashMap;
use tranche_common::Address;

/// Unclaimed history of one participant
#[derive(Debug, Clone)]
pub struct Backlog {
    pub lender: Address,
    /// Snapshots written since the participant's cursor
    pub unclaimed: u64,
    /// Simulated time of the last refresh
    pub last_update: u64,
}

/// Backlog queue: largest backlog first
pub struct ClaimQueue {
    queue: PriorityQueue<Address, u64>,
    map: HashMap<Address, Backlog>,
}

impl ClaimQueue {
    pub fn new() -> Self {
        Self {
            queue: PriorityQueue::new(),
            map: HashMap::new(),
        }
    }

    /// Push or update a backlog; empty backlogs leave the queue
    pub fn push(&mut self, backlog: Backlog) {
        let lender = backlog.lender;
        if backlog.unclaimed == 0 {
            self.remove(&lender);
            return;
        }
        self.queue.push(lender, backlog.unclaimed);
        self.map.insert(lender, backlog);
    }

    /// Pop the participant furthest behind
    pub fn pop(&mut self) -> Option<Backlog> {
        let (lender, _) = self.queue.pop()?;
        self.map.remove(&lender)
    }

    pub fn peek(&self) -> Option<&Backlog> {
        let (lender, _) = self.queue.peek()?;
        self.map.get(lender)
    }

    pub fn remove(&mut self, lender: &Address) -> Option<Backlog> {
        self.queue.remove(lender);
        self.map.remove(lender)
    }

    pub fn get(&self, lender: &Address) -> Option<&Backlog> {
        self.map.get(lender)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Total snapshots waiting to be replayed across the queue
    pub fn total_unclaimed(&self) -> u64 {
        self.map.values().map(|b| b.unclaimed).sum()
    }
}

impl Default for ClaimQueue {
    fn default() -> Self {
        Self::new()
    }
}
