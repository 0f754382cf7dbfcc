use serde::{Deserialize, Serialize};

use crate::color::{parse_hex_color, ColorFormatError, Rgb};

/// One display request as delivered by a message source
///
/// Wire form is a single JSON object: `{"message": "HI", "color": "#f00"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayRequest {
    pub message: String,
    pub color: String,
}

impl DisplayRequest {
    pub fn new(message: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            color: color.into(),
        }
    }

    /// Decode one line of newline-delimited JSON
    pub fn from_json(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line.trim())
    }

    pub fn rgb(&self) -> Result<Rgb, ColorFormatError> {
        parse_hex_color(&self.color)
    }
}
