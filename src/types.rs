use std::str::FromStr;

use serde::Deserialize;

/// What `run()` does with a prerequisite that was never added to the manager.
///
/// - `Strict`: fail with `UnregisteredPrerequisite` before anything runs
///   (default).
/// - `Discover`: walk prerequisite edges transitively and execute such tasks
///   as if they had been registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrerequisitePolicy {
    Strict,
    Discover,
}

impl Default for PrerequisitePolicy {
    fn default() -> Self {
        PrerequisitePolicy::Strict
    }
}

impl FromStr for PrerequisitePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(PrerequisitePolicy::Strict),
            "discover" => Ok(PrerequisitePolicy::Discover),
            other => Err(format!(
                "invalid prerequisites policy: {other} (expected \"strict\" or \"discover\")"
            )),
        }
    }
}

/// Behaviour when `run()` is called on a manager that already executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatRunPolicy {
    /// Fail with `AlreadyExecuted` (default).
    Error,
    /// Clear every completion flag and execute the whole graph again.
    Rerun,
    /// Do nothing and return an empty report.
    Skip,
}

impl Default for RepeatRunPolicy {
    fn default() -> Self {
        RepeatRunPolicy::Error
    }
}

impl FromStr for RepeatRunPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "error" => Ok(RepeatRunPolicy::Error),
            "rerun" => Ok(RepeatRunPolicy::Rerun),
            "skip" => Ok(RepeatRunPolicy::Skip),
            other => Err(format!(
                "invalid repeat_run policy: {other} (expected \"error\", \"rerun\" or \"skip\")"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policies_parse_case_insensitively() {
        assert_eq!(
            " Discover ".parse::<PrerequisitePolicy>(),
            Ok(PrerequisitePolicy::Discover)
        );
        assert_eq!("RERUN".parse::<RepeatRunPolicy>(), Ok(RepeatRunPolicy::Rerun));
        assert!("sometimes".parse::<RepeatRunPolicy>().is_err());
    }
}
