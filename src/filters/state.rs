//! Filter state and its reducer
//!
//! The dependency chain is `system_code -> version -> {language, edition}`.
//! Architecture is an independent axis.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::api::{FileQuery, OptionsQuery};

/// CPU architecture filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
    #[default]
    All,
    X64,
    X86,
    Arm64,
}

impl Architecture {
    pub const ALL: [Architecture; 4] = [
        Architecture::All,
        Architecture::X64,
        Architecture::X86,
        Architecture::Arm64,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Architecture::All => "all",
            Architecture::X64 => "x64",
            Architecture::X86 => "x86",
            Architecture::Arm64 => "arm64",
        }
    }

    /// Value sent to the backend; `All` is sent as an omitted parameter
    pub fn query_value(self) -> &'static str {
        match self {
            Architecture::All => "",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Architecture {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(Architecture::All),
            "x64" | "amd64" => Ok(Architecture::X64),
            "x86" => Ok(Architecture::X86),
            "arm64" | "aarch64" => Ok(Architecture::Arm64),
            other => {
                let known: Vec<&str> = Architecture::ALL.iter().map(|a| a.as_str()).collect();
                Err(format!(
                    "unknown architecture: {} (expected one of {})",
                    other,
                    known.join(", ")
                ))
            }
        }
    }
}

/// The user's current selection. Empty strings mean unselected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub system_code: String,
    pub version: String,
    pub language: String,
    pub edition: String,
    pub architecture: Architecture,
}

impl FilterState {
    /// System, version and language are required before querying
    pub fn is_queryable(&self) -> bool {
        !self.system_code.is_empty() && !self.version.is_empty() && !self.language.is_empty()
    }

    pub fn file_query(&self) -> FileQuery {
        FileQuery {
            system_code: self.system_code.clone(),
            version: self.version.clone(),
            language_code: self.language.clone(),
            architecture: self.architecture.query_value().to_string(),
            edition: self.edition.clone(),
        }
    }

    pub fn options_query(&self) -> OptionsQuery {
        OptionsQuery {
            system_code: self.system_code.clone(),
            version: self.version.clone(),
            language_code: self.language.clone(),
            architecture: self.architecture.query_value().to_string(),
        }
    }
}

/// The only ways to change a [`FilterState`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterAction {
    SetSystemCode(String),
    SetVersion(String),
    SetLanguage(String),
    SetEdition(String),
    SetArchitecture(Architecture),
}

/// Compute the next state. Cascade resets happen in the same step.
pub fn reduce(state: &FilterState, action: FilterAction) -> FilterState {
    match action {
        FilterAction::SetSystemCode(system_code) => FilterState {
            system_code,
            version: String::new(),
            language: String::new(),
            edition: String::new(),
            architecture: state.architecture,
        },
        FilterAction::SetVersion(version) => FilterState {
            version,
            language: String::new(),
            edition: String::new(),
            ..state.clone()
        },
        FilterAction::SetLanguage(language) => FilterState {
            language,
            ..state.clone()
        },
        FilterAction::SetEdition(edition) => FilterState {
            edition,
            ..state.clone()
        },
        FilterAction::SetArchitecture(architecture) => FilterState {
            architecture,
            ..state.clone()
        },
    }
}

/// Side effects a transition asks its owner to run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Effects {
    /// Drop the edition/language catalog (system changed)
    pub reset_options: bool,
    /// Fetch a fresh edition/language catalog (version changed to a value)
    pub load_options: Option<OptionsQuery>,
    /// Re-run the filtered query
    pub refresh: bool,
}

impl Effects {
    fn merge(&mut self, other: Effects) {
        if other.reset_options {
            self.reset_options = true;
            self.load_options = None;
        }
        if other.load_options.is_some() {
            self.load_options = other.load_options;
        }
        self.refresh |= other.refresh;
    }
}

/// Reduce one action and derive its effects
pub fn transition(state: &FilterState, action: FilterAction) -> (FilterState, Effects) {
    let reset_options = matches!(action, FilterAction::SetSystemCode(_));
    let version_changed = matches!(action, FilterAction::SetVersion(_));

    let next = reduce(state, action);
    let load_options = (version_changed && !next.version.is_empty()).then(|| next.options_query());
    let refresh = next != *state;

    (
        next,
        Effects {
            reset_options,
            load_options,
            refresh,
        },
    )
}

/// Reduce several actions as one batch, merging their effects
pub fn transition_all<I>(state: &FilterState, actions: I) -> (FilterState, Effects)
where
    I: IntoIterator<Item = FilterAction>,
{
    actions
        .into_iter()
        .fold((state.clone(), Effects::default()), |(current, mut effects), action| {
            let version_changed = matches!(action, FilterAction::SetVersion(_));
            let (next, step) = transition(&current, action);
            if version_changed {
                // A later version choice replaces any earlier catalog request
                effects.load_options = None;
            }
            effects.merge(step);
            (next, effects)
        })
}
