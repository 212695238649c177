//! Program number allow-list and the filtering decision.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Immutable set of accepted measuring program numbers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    programs: HashSet<i32>,
}

impl AllowList {
    pub fn new(programs: impl IntoIterator<Item = i32>) -> Self {
        Self {
            programs: programs.into_iter().collect(),
        }
    }

    pub fn contains(&self, program: i32) -> bool {
        self.programs.contains(&program)
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    /// Program numbers in ascending order, for display
    pub fn sorted(&self) -> Vec<i32> {
        let mut programs: Vec<i32> = self.programs.iter().copied().collect();
        programs.sort_unstable();
        programs
    }
}

impl FromStr for AllowList {
    type Err = std::convert::Infallible;

    /// Parse a comma-separated list such as `"7, 12,30"`
    ///
    /// Entries that are not integers, or are negative, are dropped with a
    /// warning rather than failing the whole list.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut programs = HashSet::new();

        for token in s.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            match token.parse::<i32>() {
                Ok(program) if program >= 0 => {
                    programs.insert(program);
                }
                _ => warn!("Ignoring invalid program number in filter: '{}'", token),
            }
        }

        Ok(Self { programs })
    }
}

impl fmt::Display for AllowList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .sorted()
            .iter()
            .map(i32::to_string)
            .collect::<Vec<_>>()
            .join(",");
        write!(f, "{{{}}}", joined)
    }
}

/// Decides whether a record's program number should be converted
#[derive(Debug, Clone)]
pub struct ProgramFilter {
    allow_list: AllowList,
}

impl ProgramFilter {
    pub fn new(allow_list: AllowList) -> Self {
        Self { allow_list }
    }

    pub fn accept(&self, program_number: i32) -> bool {
        self.allow_list.contains(program_number)
    }

    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }
}
