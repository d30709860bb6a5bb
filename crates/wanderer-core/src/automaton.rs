//! Counting automaton driving the harmonic selector
//!
//! Four states wired in a fixed cycle. Each step bumps the current state's
//! counter; once it reaches the threshold the automaton moves on, and the
//! operator of whichever state is current afterwards is applied to the
//! accumulated value.

use serde::{Deserialize, Serialize};

use crate::config::AutomatonConfig;
use crate::error::{Result, WandererError};

/// Number of states in the cycle
pub const STATE_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    pub fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Subtract => '-',
            Self::Multiply => '*',
            Self::Divide => '/',
        }
    }

    /// Checked application. Division rounds toward negative infinity.
    /// Returns `None` on overflow or a zero divisor.
    pub fn apply(self, lhs: i64, rhs: i64) -> Option<i64> {
        match self {
            Self::Add => lhs.checked_add(rhs),
            Self::Subtract => lhs.checked_sub(rhs),
            Self::Multiply => lhs.checked_mul(rhs),
            Self::Divide => {
                let q = lhs.checked_div(rhs)?;
                if lhs % rhs != 0 && ((lhs < 0) != (rhs < 0)) {
                    q.checked_sub(1)
                } else {
                    Some(q)
                }
            }
        }
    }
}

/// A single automaton state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub counter: u32,
    pub threshold: u32,
    pub operator: Operator,
    pub operand: i64,
}

#[derive(Debug, Clone)]
pub struct CountingAutomaton {
    states: [State; STATE_COUNT],
    current: usize,
    value: i64,
}

impl Default for CountingAutomaton {
    fn default() -> Self {
        Self::new()
    }
}

impl CountingAutomaton {
    /// Automaton with the built-in transition table
    pub fn new() -> Self {
        Self::from_states(Self::states_from(&AutomatonConfig::default()))
    }

    /// Validates the table and builds a fresh automaton from it
    pub fn from_config(config: &AutomatonConfig) -> Result<Self> {
        Self::validate(config)?;
        Ok(Self::from_states(Self::states_from(config)))
    }

    pub fn validate(config: &AutomatonConfig) -> Result<()> {
        if config.states.len() != STATE_COUNT {
            return Err(WandererError::InvalidStateCount(config.states.len()));
        }
        if let Some((index, s)) = config.states.iter().enumerate().find(|(_, s)| s.threshold == 0) {
            return Err(WandererError::InvalidThreshold { index, threshold: s.threshold });
        }
        Ok(())
    }

    fn states_from(config: &AutomatonConfig) -> [State; STATE_COUNT] {
        std::array::from_fn(|i| {
            let s = config.states[i];
            State {
                counter: 0,
                threshold: s.threshold,
                operator: s.operator,
                operand: s.operand,
            }
        })
    }

    fn from_states(states: [State; STATE_COUNT]) -> Self {
        Self { states, current: 0, value: 0 }
    }

    /// Successor of state `index` in the cycle
    pub fn successor(index: usize) -> usize {
        (index + 1) % STATE_COUNT
    }

    /// Advance one step and return the new accumulated value.
    ///
    /// On an arithmetic error the counter and state transition still happen
    /// but the accumulated value is left unchanged.
    pub fn step(&mut self) -> Result<i64> {
        let state = &mut self.states[self.current];
        state.counter += 1;
        if state.counter >= state.threshold {
            state.counter = 0;
            self.current = Self::successor(self.current);
        }

        let state = &self.states[self.current];
        if state.operator == Operator::Divide && state.operand == 0 {
            return Err(WandererError::DivisionByZero { state: self.current });
        }
        self.value = state
            .operator
            .apply(self.value, state.operand)
            .ok_or(WandererError::Overflow)?;
        Ok(self.value)
    }

    /// Back to value 0, state 0, all counters cleared
    pub fn reset(&mut self) {
        for state in &mut self.states {
            state.counter = 0;
        }
        self.current = 0;
        self.value = 0;
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_state(&self) -> &State {
        &self.states[self.current]
    }

    pub fn states(&self) -> &[State; STATE_COUNT] {
        &self.states
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StateConfig;

    fn run(automaton: &mut CountingAutomaton, steps: usize) -> Vec<i64> {
        (0..steps).map(|_| automaton.step().unwrap()).collect()
    }

    #[test]
    fn test_default_sequence() {
        let mut a = CountingAutomaton::new();
        assert_eq!(run(&mut a, 10), vec![-1, -2, 3, 1, 2, 1, 0, 5, 3, 4]);
    }

    #[test]
    fn test_steady_state_drift() {
        let mut a = CountingAutomaton::new();
        let mut previous = a.value();
        for _ in 0..20 {
            run(&mut a, 5);
            assert_eq!(a.value(), previous + 2);
            previous = a.value();
        }
    }

    #[test]
    fn test_counter_below_threshold_after_step() {
        let mut a = CountingAutomaton::new();
        for _ in 0..50 {
            a.step().unwrap();
            let s = a.current_state();
            assert!(s.counter < s.threshold);
        }
    }

    #[test]
    fn test_cycle_has_no_terminal_state() {
        let mut index = 0;
        let mut seen = [false; STATE_COUNT];
        for _ in 0..STATE_COUNT {
            seen[index] = true;
            index = CountingAutomaton::successor(index);
        }
        assert_eq!(index, 0);
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_transition_applies_new_state_operator() {
        let mut a = CountingAutomaton::new();
        a.step().unwrap();
        assert_eq!(a.current_index(), 1);
        assert_eq!(a.value(), -1);
    }

    #[test]
    fn test_reset_restarts_sequence() {
        let mut a = CountingAutomaton::new();
        run(&mut a, 7);
        a.reset();
        assert_eq!(a.value(), 0);
        assert_eq!(a.current_index(), 0);
        assert_eq!(run(&mut a, 3), vec![-1, -2, 3]);
    }

    #[test]
    fn test_divide_by_zero() {
        let config = AutomatonConfig {
            states: vec![
                StateConfig::new(1, Operator::Add, 1),
                StateConfig::new(1, Operator::Divide, 0),
                StateConfig::new(1, Operator::Add, 1),
                StateConfig::new(1, Operator::Add, 1),
            ],
        };
        let mut a = CountingAutomaton::from_config(&config).unwrap();
        assert!(matches!(a.step(), Err(WandererError::DivisionByZero { state: 1 })));
        // Transition already happened, value untouched
        assert_eq!(a.current_index(), 1);
        assert_eq!(a.value(), 0);
        assert_eq!(a.step().unwrap(), 1);
    }

    #[test]
    fn test_floor_division() {
        assert_eq!(Operator::Divide.apply(7, 2), Some(3));
        assert_eq!(Operator::Divide.apply(-7, 2), Some(-4));
        assert_eq!(Operator::Divide.apply(7, -2), Some(-4));
        assert_eq!(Operator::Divide.apply(-8, 2), Some(-4));
        assert_eq!(Operator::Divide.apply(1, 0), None);
        assert_eq!(Operator::Add.apply(i64::MAX, 1), None);
    }

    #[test]
    fn test_invalid_config() {
        let mut config = AutomatonConfig::default();
        config.states.pop();
        assert!(matches!(
            CountingAutomaton::from_config(&config),
            Err(WandererError::InvalidStateCount(3))
        ));

        let mut config = AutomatonConfig::default();
        config.states[2].threshold = 0;
        assert!(matches!(
            CountingAutomaton::from_config(&config),
            Err(WandererError::InvalidThreshold { index: 2, threshold: 0 })
        ));
    }
}
