//! Error types for wanderer

use thiserror::Error;

/// Broad class of a [`WandererError`], used to decide how the caller reacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad construction parameters. Fatal, never produces a half-built engine.
    Configuration,
    /// Arithmetic failure while stepping an automaton. Degrades to passthrough.
    Arithmetic,
    /// Malformed or unsupported event. Degrades to passthrough.
    Protocol,
}

#[derive(Debug, Error)]
pub enum WandererError {
    #[error("Harmonic table size must be at least 1, got {0}")]
    InvalidTableSize(usize),
    #[error("Automaton needs exactly 4 states, got {0}")]
    InvalidStateCount(usize),
    #[error("State {index} has threshold {threshold}, must be at least 1")]
    InvalidThreshold { index: usize, threshold: u32 },
    #[error("Config error: {0}")]
    Config(String),
    #[error("Division by zero in state {state}")]
    DivisionByZero { state: usize },
    #[error("Arithmetic overflow")]
    Overflow,
    #[error("Empty MIDI message")]
    EmptyMessage,
    #[error("Unrecognized status byte: 0x{0:02X}")]
    UnrecognizedStatus(u8),
    #[error("Truncated message: status 0x{status:02X} with {len} bytes")]
    TruncatedMessage { status: u8, len: usize },
    #[error("Trailing data: status 0x{status:02X} with {len} bytes")]
    TrailingData { status: u8, len: usize },
}

impl WandererError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidTableSize(_)
            | Self::InvalidStateCount(_)
            | Self::InvalidThreshold { .. }
            | Self::Config(_) => ErrorKind::Configuration,
            Self::DivisionByZero { .. } | Self::Overflow => ErrorKind::Arithmetic,
            Self::EmptyMessage
            | Self::UnrecognizedStatus(_)
            | Self::TruncatedMessage { .. }
            | Self::TrailingData { .. } => ErrorKind::Protocol,
        }
    }
}

pub type Result<T> = std::result::Result<T, WandererError>;
