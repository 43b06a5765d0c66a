//! Error types.
//!
//! - `ReduceError`: typed failures of the numeric reduction (estimate, propagate, fit, root).
//! - `StageError`: a `ReduceError` tagged with the pipeline branch and stage it came from.
//! - `AppError`: process-level error carrying the exit code used by the `photo` binary.
//!
//! Exit codes:
//! - 2: input / IO / configuration problem
//! - 3: not enough data to compute a quantity
//! - 4: computation failure (fit, propagation, root search, rendering)

use std::fmt;

/// Failures of the measurement-reduction core.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReduceError {
    #[error("series `{series}` has {n} sample(s); at least 2 are required to estimate spread")]
    InsufficientData { series: String, n: usize },

    #[error("confidence level must lie strictly between 0 and 1, got {0}")]
    InvalidConfidenceLevel(f64),

    #[error("unit mismatch in {context}: expected {expected}, got {actual}")]
    UnitMismatch {
        context: String,
        expected: String,
        actual: String,
    },

    #[error("unknown unit symbol `{0}`")]
    UnknownUnit(String),

    #[error("measurement channel `{0}` not found")]
    MissingChannel(String),

    #[error("{points} point(s) cannot determine a degree-{degree} polynomial")]
    UnderdeterminedFit { points: usize, degree: usize },

    #[error("ill-conditioned fit: {reason}")]
    IllConditionedFit { reason: String },

    #[error("tangent does not cross zero on [{lo}, {hi}] (f(lo) = {f_lo}, f(hi) = {f_hi})")]
    NoSignChange { lo: f64, hi: f64, f_lo: f64, f_hi: f64 },

    #[error("invalid search interval [{lo}, {hi}]")]
    InvalidInterval { lo: f64, hi: f64 },

    #[error("operand count mismatch for {formula}: expected {expected}, got {actual}")]
    OperandCount {
        formula: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("non-finite value in {0}")]
    NonFinite(String),

    #[error("chart rendering failed: {0}")]
    Render(String),

    #[error("{0}")]
    Input(String),
}

impl ReduceError {
    /// Exit code used when this error aborts the process.
    pub fn exit_code(&self) -> u8 {
        match self {
            ReduceError::InsufficientData { .. } => 3,
            ReduceError::InvalidConfidenceLevel(_)
            | ReduceError::UnknownUnit(_)
            | ReduceError::MissingChannel(_)
            | ReduceError::Input(_) => 2,
            _ => 4,
        }
    }
}

/// Pipeline stage in which a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Ingest,
    Estimate,
    Propagate,
    Fit,
    Threshold,
    Render,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Ingest => "ingest",
            Stage::Estimate => "estimate",
            Stage::Propagate => "propagate",
            Stage::Fit => "fit",
            Stage::Threshold => "threshold",
            Stage::Render => "render",
        };
        f.write_str(name)
    }
}

/// A reduction failure with the branch/stage context needed to act on it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("[{branch}/{stage}] {source}")]
pub struct StageError {
    pub branch: String,
    pub stage: Stage,
    pub source: ReduceError,
}

impl StageError {
    pub fn new(branch: impl Into<String>, stage: Stage, source: ReduceError) -> Self {
        Self {
            branch: branch.into(),
            stage,
            source,
        }
    }
}

/// Process-level error: a message plus the exit code to terminate with.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<ReduceError> for AppError {
    fn from(err: ReduceError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl From<StageError> for AppError {
    fn from(err: StageError) -> Self {
        AppError::new(err.source.exit_code(), err.to_string())
    }
}
