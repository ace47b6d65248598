use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::voice::VoiceId;

/// Why a teardown was scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// The sample ran out
    NaturalEnd,
    /// The release ramp has finished plus padding
    ReleaseTeardown,
}

#[derive(Debug, Clone, Copy)]
pub struct ScheduledTask {
    pub due_ms: f64,
    pub voice: VoiceId,
    pub kind: TaskKind,
    seq: u64,
}

// BinaryHeap is a max-heap; invert so the earliest task is on top. Ties run
// in the order they were scheduled.
impl Ord for ScheduledTask {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due_ms
            .total_cmp(&self.due_ms)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for ScheduledTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ScheduledTask {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScheduledTask {}

/// Timed voice teardowns, earliest first.
///
/// Tasks are never cancelled. Whoever acts on a due task checks the voice
/// first, so a task that lost the race does nothing.
#[derive(Debug, Default)]
pub struct Scheduler {
    heap: BinaryHeap<ScheduledTask>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due_ms: f64, voice: VoiceId, kind: TaskKind) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(ScheduledTask {
            due_ms,
            voice,
            kind,
            seq,
        });
    }

    /// Remove and return the earliest task due at or before `now_ms`.
    pub fn pop_due(&mut self, now_ms: f64) -> Option<ScheduledTask> {
        if self.heap.peek()?.due_ms <= now_ms {
            self.heap.pop()
        } else {
            None
        }
    }

    pub fn next_due(&self) -> Option<f64> {
        self.heap.peek().map(|task| task.due_ms)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
