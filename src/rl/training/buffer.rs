//! Experience replay buffer.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::AgentError;
use crate::types::Transition;

/// Fixed-capacity ring buffer of transitions with uniform sampling.
///
/// Storage is a single arena that grows up to `capacity`; afterwards the
/// write cursor wraps around and each push overwrites the oldest entry.
#[derive(Debug)]
pub struct ReplayBuffer {
    transitions: Vec<Transition>,
    capacity: usize,
    /// Slot written by the next push once the buffer is full.
    cursor: usize,
}

impl ReplayBuffer {
    /// Creates an empty buffer holding at most `capacity` transitions.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Config`] if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, AgentError> {
        if capacity == 0 {
            return Err(AgentError::Config(
                "replay buffer capacity must be positive".to_string(),
            ));
        }
        Ok(Self {
            transitions: Vec::new(),
            capacity,
            cursor: 0,
        })
    }

    /// Appends a transition, evicting the oldest one when full.
    pub fn push(&mut self, transition: Transition) {
        if self.transitions.len() < self.capacity {
            self.transitions.push(transition);
        } else {
            self.transitions[self.cursor] = transition;
            self.cursor = (self.cursor + 1) % self.capacity;
        }
    }

    /// Samples `n` distinct transitions uniformly at random.
    ///
    /// Returns `None` when fewer than `n` transitions are stored (or `n` is
    /// zero): the caller is not ready to train yet.
    pub fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Option<Vec<&Transition>> {
        if n == 0 || self.transitions.len() < n {
            return None;
        }
        Some(self.transitions.choose_multiple(rng, n).collect())
    }

    /// Iterates from the oldest to the newest stored transition.
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        let (newer, older) = self.transitions.split_at(self.cursor);
        older.iter().chain(newer.iter())
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.transitions.len() == self.capacity
    }

    /// Drops every stored transition.
    pub fn clear(&mut self) {
        self.transitions.clear();
        self.cursor = 0;
    }
}
