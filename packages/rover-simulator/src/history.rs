//! history.rs — Bounded buffer of recent telemetry frames
//!
//! Sized to the dashboard chart window by default. Late joiners get the whole
//! buffer so their chart is not empty for the first half minute.

use std::collections::VecDeque;

use rover_types::TelemetryFrame;

pub const DEFAULT_HISTORY_LEN: usize = 30;

#[derive(Debug, Clone)]
pub struct TelemetryHistory {
    frames: VecDeque<TelemetryFrame>,
    capacity: usize,
}

impl Default for TelemetryHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LEN)
    }
}

impl TelemetryHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { frames: VecDeque::with_capacity(capacity), capacity }
    }

    pub fn push(&mut self, frame: TelemetryFrame) {
        if self.frames.len() == self.capacity {
            self.frames.pop_front();
        }
        self.frames.push_back(frame);
    }

    /// Oldest first, as a chart wants them.
    pub fn frames(&self) -> Vec<TelemetryFrame> {
        self.frames.iter().cloned().collect()
    }

    /// Newest `n` frames, newest first (recent readings table).
    pub fn recent(&self, n: usize) -> Vec<TelemetryFrame> {
        self.frames.iter().rev().take(n).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rover_types::TelemetryState;

    fn frame(tick: u64) -> TelemetryFrame {
        TelemetryFrame {
            tick,
            timestamp_ms: tick as i64 * 1200,
            autonomous: false,
            paused: false,
            state: TelemetryState::default(),
        }
    }

    #[test]
    fn evicts_oldest_past_capacity() {
        let mut h = TelemetryHistory::new(3);
        for t in 1..=5 {
            h.push(frame(t));
        }
        let ticks: Vec<u64> = h.frames().iter().map(|f| f.tick).collect();
        assert_eq!(ticks, vec![3, 4, 5]);
    }

    #[test]
    fn recent_is_newest_first() {
        let mut h = TelemetryHistory::default();
        for t in 1..=12 {
            h.push(frame(t));
        }
        let ticks: Vec<u64> = h.recent(10).iter().map(|f| f.tick).collect();
        assert_eq!(ticks, (3..=12).rev().collect::<Vec<_>>());
        assert_eq!(h.recent(50).len(), 12);
    }

    #[test]
    fn zero_capacity_still_keeps_latest() {
        let mut h = TelemetryHistory::new(0);
        h.push(frame(1));
        h.push(frame(2));
        assert_eq!(h.len(), 1);
        assert_eq!(h.frames()[0].tick, 2);
    }
}
