use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Browser window size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewportParseError {
    #[error("window size must look like WIDTHxHEIGHT, e.g. 1280x720")]
    InvalidFormat,
    #[error("window width is not a number: {0}")]
    InvalidWidth(String),
    #[error("window height is not a number: {0}")]
    InvalidHeight(String),
    #[error("window dimensions must be positive")]
    Empty,
}

impl FromStr for Viewport {
    type Err = ViewportParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or(ViewportParseError::InvalidFormat)?;

        let width: u32 = w
            .trim()
            .parse()
            .map_err(|_| ViewportParseError::InvalidWidth(w.trim().to_string()))?;
        let height: u32 = h
            .trim()
            .parse()
            .map_err(|_| ViewportParseError::InvalidHeight(h.trim().to_string()))?;

        if width == 0 || height == 0 {
            return Err(ViewportParseError::Empty);
        }
        Ok(Viewport { width, height })
    }
}

impl std::fmt::Display for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
