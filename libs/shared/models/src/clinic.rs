use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The clinic's two service lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Specialty {
    #[serde(alias = "eye_care", alias = "eye-care")]
    Eyecare,
    Gynecology,
}

impl Specialty {
    pub const ALL: [Specialty; 2] = [Specialty::Eyecare, Specialty::Gynecology];

    pub fn as_str(&self) -> &'static str {
        match self {
            Specialty::Eyecare => "eyecare",
            Specialty::Gynecology => "gynecology",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Specialty::Eyecare => "Eye Care",
            Specialty::Gynecology => "Gynecology",
        }
    }
}

impl fmt::Display for Specialty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Specialty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "eyecare" | "eye_care" | "eye-care" => Ok(Specialty::Eyecare),
            "gynecology" => Ok(Specialty::Gynecology),
            other => Err(format!("unknown specialty: {}", other)),
        }
    }
}
