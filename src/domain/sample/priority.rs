use serde::{Deserialize, Serialize};
use std::fmt;

/// Laboratory scheduling priority of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SamplePriority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

impl SamplePriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            SamplePriority::Low => "low",
            SamplePriority::Normal => "normal",
            SamplePriority::High => "high",
            SamplePriority::Urgent => "urgent",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(SamplePriority::Low),
            "normal" => Some(SamplePriority::Normal),
            "high" => Some(SamplePriority::High),
            "urgent" => Some(SamplePriority::Urgent),
            _ => None,
        }
    }
}

impl fmt::Display for SamplePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
