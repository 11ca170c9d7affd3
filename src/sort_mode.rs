//! Host list ordering

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Display ordering of the host list.
///
/// The snake_case key (`alias_asc`, ...) is what ends up in `settings.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    AliasAsc,
    AliasDesc,
    LastSeenDesc,
    LastSeenAsc,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sort mode `{0}`")]
pub struct ParseSortModeError(pub String);

impl SortMode {
    /// Every mode, in the order the UI cycles through them.
    pub const ALL: [SortMode; 4] = [
        SortMode::AliasAsc,
        SortMode::AliasDesc,
        SortMode::LastSeenDesc,
        SortMode::LastSeenAsc,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortMode::AliasAsc => "alias_asc",
            SortMode::AliasDesc => "alias_desc",
            SortMode::LastSeenDesc => "last_seen_desc",
            SortMode::LastSeenAsc => "last_seen_asc",
        }
    }

    /// Short label for the status bar.
    pub fn label(self) -> &'static str {
        match self {
            SortMode::AliasAsc => "Alias ↑",
            SortMode::AliasDesc => "Alias ↓",
            SortMode::LastSeenDesc => "Last SSH ↓",
            SortMode::LastSeenAsc => "Last SSH ↑",
        }
    }

    /// Validity check for a stored key. Returns `None` for anything that is
    /// not one of the known keys, including the empty string.
    pub fn from_key(key: &str) -> Option<SortMode> {
        SortMode::ALL.into_iter().find(|mode| mode.as_str() == key)
    }

    pub fn reverse(self) -> SortMode {
        match self {
            SortMode::AliasAsc => SortMode::AliasDesc,
            SortMode::AliasDesc => SortMode::AliasAsc,
            SortMode::LastSeenDesc => SortMode::LastSeenAsc,
            SortMode::LastSeenAsc => SortMode::LastSeenDesc,
        }
    }

    /// Switch between alias and last-seen ordering.
    ///
    /// Natural orders map to each other (alias ascending, most recently seen
    /// first), as do the reversed ones.
    pub fn toggle_field(self) -> SortMode {
        match self {
            SortMode::AliasAsc => SortMode::LastSeenDesc,
            SortMode::LastSeenDesc => SortMode::AliasAsc,
            SortMode::AliasDesc => SortMode::LastSeenAsc,
            SortMode::LastSeenAsc => SortMode::AliasDesc,
        }
    }

    pub fn next(self) -> SortMode {
        let idx = SortMode::ALL
            .iter()
            .position(|mode| *mode == self)
            .unwrap_or(0);
        SortMode::ALL[(idx + 1) % SortMode::ALL.len()]
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = ParseSortModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortMode::from_key(s).ok_or_else(|| ParseSortModeError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_key_parses_back_to_its_mode() {
        for mode in SortMode::ALL {
            assert_eq!(mode.as_str().parse::<SortMode>(), Ok(mode));
        }
    }

    #[test]
    fn test_unknown_and_empty_keys_are_invalid() {
        assert_eq!(SortMode::from_key("not-a-real-mode"), None);
        assert_eq!(SortMode::from_key(""), None);
        assert_eq!(SortMode::from_key("Alias_Asc"), None);

        let err = "bogus".parse::<SortMode>().unwrap_err();
        assert_eq!(err.to_string(), "unknown sort mode `bogus`");
    }

    #[test]
    fn test_serde_uses_the_same_key_as_as_str() {
        for mode in SortMode::ALL {
            let json = serde_json::to_string(&mode).expect("serialize");
            assert_eq!(json, format!("\"{}\"", mode.as_str()));
        }
    }

    #[test]
    fn test_reverse_flips_direction_only() {
        assert_eq!(SortMode::AliasAsc.reverse(), SortMode::AliasDesc);
        assert_eq!(SortMode::LastSeenDesc.reverse(), SortMode::LastSeenAsc);
        for mode in SortMode::ALL {
            assert_eq!(mode.reverse().reverse(), mode);
            assert_ne!(mode.reverse(), mode);
        }
    }

    #[test]
    fn test_toggle_field_keeps_relative_direction() {
        // Arrange / Act / Assert
        assert_eq!(SortMode::AliasAsc.toggle_field(), SortMode::LastSeenDesc);
        assert_eq!(SortMode::AliasDesc.toggle_field(), SortMode::LastSeenAsc);
        for mode in SortMode::ALL {
            assert_eq!(mode.toggle_field().toggle_field(), mode);
        }
    }

    #[test]
    fn test_next_cycles_through_all_modes() {
        let mut mode = SortMode::AliasAsc;
        let mut seen = Vec::new();
        for _ in 0..SortMode::ALL.len() {
            seen.push(mode);
            mode = mode.next();
        }
        assert_eq!(mode, SortMode::AliasAsc);
        assert_eq!(seen, SortMode::ALL.to_vec());
    }

    #[test]
    fn test_labels_are_distinct() {
        let labels: std::collections::HashSet<_> =
            SortMode::ALL.iter().map(|m| m.label()).collect();
        assert_eq!(labels.len(), SortMode::ALL.len());
    }
}
