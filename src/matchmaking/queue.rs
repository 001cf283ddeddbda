//! Per-size FIFO queue of waiting participants

use crate::types::ParticipantId;
use std::collections::{HashMap, VecDeque};
use tracing::debug;

/// Waiting participants partitioned by board size
///
/// Each bucket holds a participant at most once. The earliest arrival is
/// always the one handed out as opponent.
#[derive(Debug, Clone, Default)]
pub struct PlayerQueue {
    buckets: HashMap<usize, VecDeque<ParticipantId>>,
}

impl PlayerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a participant to the bucket for `size`; returns false if already there
    pub fn enqueue(&mut self, participant_id: ParticipantId, size: usize) -> bool {
        let bucket = self.buckets.entry(size).or_default();
        if bucket.contains(&participant_id) {
            return false;
        }
        bucket.push_back(participant_id);
        debug!(
            "Participant {} queued for size {} (waiting: {})",
            participant_id,
            size,
            bucket.len()
        );
        true
    }

    /// Pair `participant_id` with the head of its bucket
    ///
    /// Requires at least two entries including `participant_id`. On success both
    /// are dequeued and the opponent is returned; otherwise the queue is unchanged.
    pub fn pair_opponent(&mut self, participant_id: ParticipantId, size: usize) -> Option<ParticipantId> {
        let bucket = self.buckets.get_mut(&size)?;
        if bucket.len() < 2 {
            return None;
        }

        let index = bucket.iter().position(|&id| id == participant_id)?;
        bucket.remove(index);
        let opponent = bucket.pop_front()?;

        debug!(
            "Paired participant {} with {} for size {} (remaining: {})",
            participant_id,
            opponent,
            size,
            bucket.len()
        );
        Some(opponent)
    }

    /// Remove a participant from the bucket for `size`; returns whether it was there
    pub fn remove(&mut self, participant_id: ParticipantId, size: usize) -> bool {
        match self.buckets.get_mut(&size) {
            Some(bucket) => {
                let before = bucket.len();
                bucket.retain(|&id| id != participant_id);
                bucket.len() != before
            }
            None => false,
        }
    }

    /// Remove a participant from whichever bucket holds it, returning that size
    pub fn remove_everywhere(&mut self, participant_id: ParticipantId) -> Option<usize> {
        let size = self.queued_size(participant_id)?;
        self.remove(participant_id, size);
        Some(size)
    }

    /// Size of the bucket the participant waits in, if any
    pub fn queued_size(&self, participant_id: ParticipantId) -> Option<usize> {
        self.buckets
            .iter()
            .find(|(_, bucket)| bucket.contains(&participant_id))
            .map(|(&size, _)| size)
    }

    /// Zero-based position of a participant in its bucket
    pub fn position(&self, participant_id: ParticipantId, size: usize) -> Option<usize> {
        self.buckets
            .get(&size)?
            .iter()
            .position(|&id| id == participant_id)
    }

    /// Number of participants waiting for `size`
    pub fn waiting(&self, size: usize) -> usize {
        self.buckets.get(&size).map_or(0, VecDeque::len)
    }

    /// Waiting count per size, ascending by size
    pub fn waiting_by_size(&self) -> Vec<(usize, usize)> {
        let mut counts: Vec<_> = self
            .buckets
            .iter()
            .map(|(&size, bucket)| (size, bucket.len()))
            .collect();
        counts.sort_unstable();
        counts
    }

    /// Total participants waiting across all sizes
    pub fn len(&self) -> usize {
        self.buckets.values().map(VecDeque::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
