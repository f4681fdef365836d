//! Requested packaging actions and build type.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A packaging action requested on the command line.
///
/// `Copy` only replays staging into the destination tree, `Unpacked` also
/// prepares the tree for running in place, `Package` additionally runs the
/// platform finish step that produces an installer.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Action {
    /// Stage files only
    Copy,
    /// Stage and prepare the tree without producing an installer
    Unpacked,
    /// Stage and produce the installer artifact
    Package,
}

impl Action {
    /// Lowercase command-line name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Copy => "copy",
            Action::Unpacked => "unpacked",
            Action::Package => "package",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "copy" => Ok(Action::Copy),
            "unpacked" => Ok(Action::Unpacked),
            "package" => Ok(Action::Package),
            other => Err(format!(
                "unknown action '{}' (expected package, unpacked or copy)",
                other
            )),
        }
    }
}

/// Set of requested actions.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Actions(BTreeSet<Action>);

impl Actions {
    /// Builds the set from any iterator of actions.
    pub fn new(actions: impl IntoIterator<Item = Action>) -> Self {
        Self(actions.into_iter().collect())
    }

    /// Parses a comma or whitespace separated list, e.g. `"package,unpacked"`.
    pub fn parse_list(list: &str) -> Result<Self, String> {
        list.split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .map(Action::from_str)
            .collect::<Result<BTreeSet<_>, _>>()
            .map(Self)
    }

    /// Whether `action` was requested.
    pub fn contains(&self, action: Action) -> bool {
        self.0.contains(&action)
    }

    /// Whether the finish step (installer creation) should run.
    pub fn is_packaging(&self) -> bool {
        self.contains(Action::Package)
    }

    /// Iterates the requested actions in a stable order.
    pub fn iter(&self) -> impl Iterator<Item = Action> + '_ {
        self.0.iter().copied()
    }
}

impl fmt::Display for Actions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.0.iter().map(Action::as_str).collect();
        f.write_str(&names.join(","))
    }
}

/// Whether this is a release build.
///
/// Release builds get stripped binaries and a compressed archive on Linux;
/// anything else keeps symbols and skips archive creation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BuildType {
    /// Release build
    Release,
    /// Any other build type, with its original name
    Other(String),
}

impl BuildType {
    /// Whether this is a release build (case-insensitive).
    pub fn is_release(&self) -> bool {
        matches!(self, BuildType::Release)
    }
}

impl From<&str> for BuildType {
    fn from(s: &str) -> Self {
        if s.eq_ignore_ascii_case("release") {
            BuildType::Release
        } else {
            BuildType::Other(s.to_string())
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildType::Release => f.write_str("Release"),
            BuildType::Other(name) => f.write_str(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_action_list() {
        let actions = Actions::parse_list("package, unpacked").unwrap();
        assert!(actions.is_packaging());
        assert!(actions.contains(Action::Unpacked));
        assert!(!actions.contains(Action::Copy));
        assert_eq!(actions.to_string(), "unpacked,package");
    }

    #[test]
    fn rejects_unknown_action() {
        assert!(Actions::parse_list("package,deploy").is_err());
    }

    #[test]
    fn build_type_is_case_insensitive() {
        assert!(BuildType::from("RELEASE").is_release());
        assert!(!BuildType::from("RelWithDebInfo").is_release());
    }
}
