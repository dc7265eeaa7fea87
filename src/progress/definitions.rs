//! Badge definitions and the module topic table
//!
//! Badges are unlocked by predicates over the progression state. Topic badges
//! look modules up in an explicit module -> topic table instead of matching
//! on the module id text.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Unique identifier for each badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BadgeId {
    Explorer,
    RightsGuardian,
    ActivityHero,
    AiElderApprentice,
    SustainabilitySteward,
    QuantumDefender,
}

impl BadgeId {
    /// Get the string ID used in the persisted state
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Explorer => "explorer",
            Self::RightsGuardian => "rights-guardian",
            Self::ActivityHero => "activity-hero",
            Self::AiElderApprentice => "ai-elder-apprentice",
            Self::SustainabilitySteward => "sustainability-steward",
            Self::QuantumDefender => "quantum-defender",
        }
    }
}

impl fmt::Display for BadgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Learning topic a module belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicTag {
    /// Proof of Status
    Post,
    /// Proof of Activity
    Poat,
    Ai,
    /// Sustainable development goals
    Sdg,
    /// Post-quantum cryptography
    Quantum,
}

impl TopicTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Poat => "poat",
            Self::Ai => "ai",
            Self::Sdg => "sdg",
            Self::Quantum => "quantum",
        }
    }
}

impl FromStr for TopicTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "post" => Ok(Self::Post),
            "poat" => Ok(Self::Poat),
            "ai" => Ok(Self::Ai),
            "sdg" => Ok(Self::Sdg),
            "quantum" => Ok(Self::Quantum),
            other => Err(format!("unknown topic tag: {other}")),
        }
    }
}

/// Unlock rule of a badge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgePredicate {
    /// At least this many modules completed
    ModulesCompleted(usize),
    /// Some completed module carries this topic
    Topic(TopicTag),
}

/// Badge definition with all metadata
#[derive(Debug, Clone)]
pub struct BadgeDefinition {
    pub id: BadgeId,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub predicate: BadgePredicate,
}

/// All badge definitions
pub static BADGES: &[BadgeDefinition] = &[
    BadgeDefinition {
        id: BadgeId::Explorer,
        name: "Explorer Badge",
        description: "Completed 3 modules",
        icon: "/badges/explorer.svg",
        predicate: BadgePredicate::ModulesCompleted(3),
    },
    BadgeDefinition {
        id: BadgeId::RightsGuardian,
        name: "Rights Guardian",
        description: "Mastered PoST",
        icon: "/badges/rights-guardian.svg",
        predicate: BadgePredicate::Topic(TopicTag::Post),
    },
    BadgeDefinition {
        id: BadgeId::ActivityHero,
        name: "Activity Hero",
        description: "Mastered PoAT",
        icon: "/badges/activity-hero.svg",
        predicate: BadgePredicate::Topic(TopicTag::Poat),
    },
    BadgeDefinition {
        id: BadgeId::AiElderApprentice,
        name: "AI Elder Apprentice",
        description: "Completed AI chapter",
        icon: "/badges/ai-elder.svg",
        predicate: BadgePredicate::Topic(TopicTag::Ai),
    },
    BadgeDefinition {
        id: BadgeId::SustainabilitySteward,
        name: "Sustainability Steward",
        description: "SDG module completed",
        icon: "/badges/sustainability.svg",
        predicate: BadgePredicate::Topic(TopicTag::Sdg),
    },
    BadgeDefinition {
        id: BadgeId::QuantumDefender,
        name: "Quantum Defender",
        description: "Post-quantum crypto module",
        icon: "/badges/quantum.svg",
        predicate: BadgePredicate::Topic(TopicTag::Quantum),
    },
];

/// Built-in module -> topic assignments
const DEFAULT_MODULE_TOPICS: &[(&str, &[TopicTag])] = &[
    ("post-module", &[TopicTag::Post]),
    ("poat-module", &[TopicTag::Poat]),
    ("ai-elder-module", &[TopicTag::Ai]),
    ("sdg-module", &[TopicTag::Sdg]),
    ("quantum-crypto-module", &[TopicTag::Quantum]),
];

/// Topics of each known module. Modules not in the table have no topics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleTopics {
    table: HashMap<String, Vec<TopicTag>>,
}

impl Default for ModuleTopics {
    fn default() -> Self {
        let table = DEFAULT_MODULE_TOPICS
            .iter()
            .map(|(module, tags)| (module.to_string(), tags.to_vec()))
            .collect();
        Self { table }
    }
}

impl ModuleTopics {
    /// Table without any assignments
    pub fn empty() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Add (or replace) the topics of a module
    pub fn assign(&mut self, module_id: impl Into<String>, tags: Vec<TopicTag>) {
        self.table.insert(module_id.into(), tags);
    }

    /// Merge extra assignments over the current table
    pub fn extend<I, S>(&mut self, extra: I)
    where
        I: IntoIterator<Item = (S, Vec<TopicTag>)>,
        S: Into<String>,
    {
        for (module, tags) in extra {
            self.assign(module, tags);
        }
    }

    pub fn topics_of(&self, module_id: &str) -> &[TopicTag] {
        self.table.get(module_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_topic(&self, module_id: &str, tag: TopicTag) -> bool {
        self.topics_of(module_id).contains(&tag)
    }
}
