use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// On/off setting that takes an explicit `true` or `false` on every layer.
///
/// A plain `bool` field would surface on the command line as a presence flag
/// whose absence still reads as `false` and masks file and environment values.
/// Taking a value keeps an omitted flag absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Switch(bool);

impl Switch {
    /// Enabled switch.
    pub const ON: Self = Self(true);
    /// Disabled switch.
    pub const OFF: Self = Self(false);

    /// Whether the switch is on.
    #[must_use]
    pub const fn is_on(self) -> bool {
        self.0
    }
}

impl From<bool> for Switch {
    fn from(value: bool) -> Self {
        Self(value)
    }
}

impl FromStr for Switch {
    type Err = std::str::ParseBoolError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        text.trim().to_ascii_lowercase().parse().map(Self)
    }
}

impl fmt::Display for Switch {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}
