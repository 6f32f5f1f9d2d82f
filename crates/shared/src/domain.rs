use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ParseModeError, ParseRadixError};

/// Width of the integer the programmer view operates on.
pub const BIT_WIDTH: u32 = 64;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(HistoryId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Standard,
    Scientific,
    Programmer,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Standard, Mode::Scientific, Mode::Programmer];

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Standard => "standard",
            Mode::Scientific => "scientific",
            Mode::Programmer => "programmer",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" | "std" => Ok(Mode::Standard),
            "scientific" | "sci" => Ok(Mode::Scientific),
            "programmer" | "prog" => Ok(Mode::Programmer),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}

/// Numeral base used to render and interpret the current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Radix {
    Binary,
    Octal,
    #[default]
    Decimal,
    Hexadecimal,
}

impl Radix {
    pub const ALL: [Radix; 4] = [
        Radix::Hexadecimal,
        Radix::Decimal,
        Radix::Octal,
        Radix::Binary,
    ];

    pub fn base(self) -> u32 {
        match self {
            Radix::Binary => 2,
            Radix::Octal => 8,
            Radix::Decimal => 10,
            Radix::Hexadecimal => 16,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Radix::Binary => "BIN",
            Radix::Octal => "OCT",
            Radix::Decimal => "DEC",
            Radix::Hexadecimal => "HEX",
        }
    }
}

impl fmt::Display for Radix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Radix {
    type Err = ParseRadixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bin" | "binary" | "2" => Ok(Radix::Binary),
            "oct" | "octal" | "8" => Ok(Radix::Octal),
            "dec" | "decimal" | "10" => Ok(Radix::Decimal),
            "hex" | "hexadecimal" | "16" => Ok(Radix::Hexadecimal),
            _ => Err(ParseRadixError(s.to_string())),
        }
    }
}
