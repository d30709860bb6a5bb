//! Engine configuration

use serde::{Deserialize, Serialize};

use crate::automaton::Operator;

/// One row of the automaton's transition table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateConfig {
    pub threshold: u32,
    pub operator: Operator,
    pub operand: i64,
}

impl StateConfig {
    pub const fn new(threshold: u32, operator: Operator, operand: i64) -> Self {
        Self { threshold, operator, operand }
    }
}

/// Transition table for a counting automaton, wired cyclically in list order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomatonConfig {
    pub states: Vec<StateConfig>,
}

impl Default for AutomatonConfig {
    fn default() -> Self {
        Self {
            states: vec![
                StateConfig::new(1, Operator::Add, 1),
                StateConfig::new(2, Operator::Subtract, 1),
                StateConfig::new(1, Operator::Add, 5),
                StateConfig::new(1, Operator::Subtract, 2),
            ],
        }
    }
}

/// Settings shared by every per-channel processor of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of entries in the harmonic table
    pub table_size: usize,
    pub automaton: AutomatonConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            table_size: 8,
            automaton: AutomatonConfig::default(),
        }
    }
}
