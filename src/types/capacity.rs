// ABOUTME: Elastic group capacity triple (minimum, maximum, target).
// ABOUTME: Validates ordering so invalid requests never reach the provider.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CapacityError {
    #[error("target {target} is below minimum {minimum}")]
    TargetBelowMinimum { minimum: u32, target: u32 },

    #[error("target {target} exceeds maximum {maximum}")]
    TargetAboveMaximum { maximum: u32, target: u32 },
}

/// Instance count bounds of an elastic group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Capacity {
    pub minimum: u32,
    pub maximum: u32,
    pub target: u32,
}

impl Capacity {
    pub fn new(minimum: u32, maximum: u32, target: u32) -> Self {
        Self {
            minimum,
            maximum,
            target,
        }
    }

    /// `{0, 0, 0}`: no instances at all.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Fixed-size capacity where min, max and target are all `n`.
    pub fn fixed(n: u32) -> Self {
        Self::new(n, n, n)
    }

    pub fn is_zero(&self) -> bool {
        self.target == 0 && self.maximum == 0 && self.minimum == 0
    }

    pub fn validate(&self) -> Result<(), CapacityError> {
        if self.target < self.minimum {
            return Err(CapacityError::TargetBelowMinimum {
                minimum: self.minimum,
                target: self.target,
            });
        }
        if self.target > self.maximum {
            return Err(CapacityError::TargetAboveMaximum {
                maximum: self.maximum,
                target: self.target,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "min: [{}], max: [{}], desired: [{}]",
            self.minimum, self.maximum, self.target
        )
    }
}
