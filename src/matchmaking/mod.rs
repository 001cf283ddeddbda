//! Matchmaking queues
//!
//! Participants waiting for a human opponent are held in one FIFO bucket per
//! board size.

pub mod queue;

pub use queue::PlayerQueue;
