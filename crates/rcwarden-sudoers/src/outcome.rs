//! Validator verdicts and update outcomes.

/// Verdict produced by the validator for one staging copy.
///
/// Consumed exactly once per attempt. The exit status alone decides
/// acceptance; the diagnostics only feed user-facing messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationVerdict {
    /// The validator exited successfully.
    Accepted {
        /// Combined validator output.
        diagnostics: String,
    },
    /// The validator exited unsuccessfully.
    Rejected {
        /// Combined validator output.
        diagnostics: String,
    },
}

impl ValidationVerdict {
    /// Builds a verdict from the validator's exit status.
    #[must_use]
    pub fn from_exit(success: bool, diagnostics: impl Into<String>) -> Self {
        let diagnostics = diagnostics.into();
        if success {
            Self::Accepted { diagnostics }
        } else {
            Self::Rejected { diagnostics }
        }
    }

    /// Returns true when the validator accepted the staging copy.
    #[must_use]
    pub const fn accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    /// Validator output, possibly empty.
    #[must_use]
    pub fn diagnostics(&self) -> &str {
        match self {
            Self::Accepted { diagnostics } | Self::Rejected { diagnostics } => diagnostics,
        }
    }
}

/// Result of a completed update attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The entry was validated and the live file replaced.
    Committed,
    /// The validator rejected the entry; the live file is unchanged.
    Rejected {
        /// Validator output explaining the rejection.
        diagnostics: String,
    },
}

impl UpdateOutcome {
    /// Returns true when the live file now contains the entry.
    #[must_use]
    pub const fn committed(&self) -> bool {
        matches!(self, Self::Committed)
    }

    /// Validator output for rejected entries.
    #[must_use]
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            Self::Committed => None,
            Self::Rejected { diagnostics } => Some(diagnostics),
        }
    }
}
