use regex::RegexSet;

use super::defaults::default_blocklist;

/// Matches shell commands against a blocklist of regex patterns.
pub struct CommandFilter {
    patterns: RegexSet,
    reasons: Vec<String>,
}

/// A command rejected by the filter, with the reason of the first matching pattern.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct BlockedCommand {
    pub blocked: bool,
    pub reason: String,
    pub command: String,
}

impl CommandFilter {
    /// Compile a filter from `(pattern, reason)` pairs. All patterns go into
    /// one `RegexSet` so a check is a single pass over the command.
    pub fn new(patterns: &[(String, String)]) -> Result<Self, regex::Error> {
        let (regexes, reasons): (Vec<_>, Vec<_>) = patterns.iter().cloned().unzip();
        Ok(Self {
            patterns: RegexSet::new(&regexes)?,
            reasons,
        })
    }

    pub fn from_defaults() -> Result<Self, regex::Error> {
        Self::new(&default_blocklist())
    }

    /// `Some` when the command matches any pattern; the earliest pattern in
    /// the list supplies the reason.
    pub fn check(&self, command: &str) -> Option<BlockedCommand> {
        let first = self.patterns.matches(command).into_iter().next()?;
        Some(BlockedCommand {
            blocked: true,
            reason: self.reasons[first].clone(),
            command: command.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.reasons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reasons.is_empty()
    }
}

impl BlockedCommand {
    /// Single-line JSON form returned on stderr in place of running the command.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!("{{\"blocked\":true,\"reason\":{:?}}}", self.reason)
        })
    }
}
