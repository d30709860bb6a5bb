//! Harmonic processor: one automaton driving one harmonic table

use serde::{Deserialize, Serialize};

use crate::automaton::{CountingAutomaton, State};
use crate::config::AutomatonConfig;
use crate::error::{Result, WandererError};
use crate::harmonics::HarmonicTable;

/// Modulo whose result is always in `[0, n)`, whatever the sign of `raw`.
///
/// `n` must be at least 1.
pub fn floor_mod(raw: i64, n: usize) -> usize {
    raw.rem_euclid(n as i64) as usize
}

/// Read-only view of a processor, cloned out for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorSnapshot {
    pub value: i64,
    pub state_index: usize,
    pub state: State,
    pub last_index: Option<usize>,
    pub harmonics: Vec<i32>,
}

#[derive(Debug, Clone)]
pub struct HarmonicProcessor {
    table: HarmonicTable,
    automaton: CountingAutomaton,
    last_index: Option<usize>,
}

impl HarmonicProcessor {
    pub fn new(size: usize) -> Result<Self> {
        Self::with_automaton(size, &AutomatonConfig::default())
    }

    pub fn with_automaton(size: usize, config: &AutomatonConfig) -> Result<Self> {
        Ok(Self {
            table: HarmonicTable::build(size)?,
            automaton: CountingAutomaton::from_config(config)?,
            last_index: None,
        })
    }

    /// Advance the automaton once and transpose `note` by the selected harmonic
    pub fn process(&mut self, note: i32) -> Result<i32> {
        let raw = self.automaton.step()?;
        let index = floor_mod(raw, self.table.len());
        let delta = self.table.get(index).unwrap_or_default();
        self.last_index = Some(index);
        note.checked_add(delta).ok_or(WandererError::Overflow)
    }

    pub fn reset(&mut self) {
        self.automaton.reset();
        self.last_index = None;
    }

    pub fn last_index(&self) -> Option<usize> {
        self.last_index
    }

    pub fn snapshot(&self) -> ProcessorSnapshot {
        ProcessorSnapshot {
            value: self.automaton.value(),
            state_index: self.automaton.current_index(),
            state: *self.automaton.current_state(),
            last_index: self.last_index,
            harmonics: self.table.as_slice().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_mod() {
        assert_eq!(floor_mod(-1, 8), 7);
        assert_eq!(floor_mod(-8, 8), 0);
        assert_eq!(floor_mod(-9, 8), 7);
        assert_eq!(floor_mod(13, 8), 5);
        assert_eq!(floor_mod(i64::MIN, 7), 6);
        for raw in -200..200 {
            for n in 1..12 {
                assert!(floor_mod(raw, n) < n);
            }
        }
    }

    #[test]
    fn test_process_sequence() {
        // Steps -1, -2, 3, 1, 2 select indices 7, 6, 3, 1, 2
        let mut p = HarmonicProcessor::new(8).unwrap();
        let out: Vec<i32> = (0..5).map(|_| p.process(60).unwrap()).collect();
        assert_eq!(out, vec![96, 94, 84, 72, 79]);
        assert_eq!(p.last_index(), Some(2));
    }

    #[test]
    fn test_no_clamping() {
        let mut p = HarmonicProcessor::new(8).unwrap();
        assert_eq!(p.process(120).unwrap(), 156);
        assert_eq!(p.process(-50).unwrap(), -16);
    }

    #[test]
    fn test_reset() {
        let mut p = HarmonicProcessor::new(8).unwrap();
        p.process(60).unwrap();
        p.process(60).unwrap();
        p.reset();
        assert_eq!(p.last_index(), None);
        assert_eq!(p.process(60).unwrap(), 96);
    }

    #[test]
    fn test_snapshot() {
        let mut p = HarmonicProcessor::new(4).unwrap();
        p.process(0).unwrap();
        let snap = p.snapshot();
        assert_eq!(snap.value, -1);
        assert_eq!(snap.state_index, 1);
        assert_eq!(snap.last_index, Some(3));
        assert_eq!(snap.harmonics, vec![0, 12, 19, 24]);
    }

    #[test]
    fn test_invalid_size() {
        assert!(HarmonicProcessor::new(0).is_err());
    }
}
