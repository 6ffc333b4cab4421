use serde::{Deserialize, Serialize};

// ── Join key ──

/// The join key between diff-space and classification-space: a file path plus
/// the hunk's index within that file's *original, unfiltered* hunk list.
/// Filtered views must translate back to this space before any lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HunkKey {
    pub file: String,
    pub hunk: usize,
}

impl HunkKey {
    pub fn new(file: impl Into<String>, hunk: usize) -> Self {
        HunkKey {
            file: file.into(),
            hunk,
        }
    }
}

// ── Classification enums ──

/// How the classifier categorized a hunk, driving dimming and collapse defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Refactoring,
    Systematic,
    Core,
    Noise,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Refactoring => "refactoring",
            Category::Systematic => "systematic",
            Category::Core => "core",
            Category::Noise => "noise",
        }
    }

    /// Non-core categories render dimmed and skip syntax highlighting
    pub fn is_dimmed(&self) -> bool {
        !matches!(self, Category::Core)
    }
}

/// The overall storytelling pattern chosen for the diff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NarrativePattern {
    #[serde(alias = "cause_effect")]
    CauseEffect,
    #[serde(alias = "core_periphery")]
    CorePeriphery,
    #[serde(alias = "before_after")]
    BeforeAfter,
    #[serde(alias = "entry_implementation")]
    EntryImplementation,
    #[serde(alias = "rule_instances")]
    RuleInstances,
}

impl NarrativePattern {
    pub fn label(&self) -> &'static str {
        match self {
            NarrativePattern::CauseEffect => "cause-effect",
            NarrativePattern::CorePeriphery => "core-periphery",
            NarrativePattern::BeforeAfter => "before-after",
            NarrativePattern::EntryImplementation => "entry-implementation",
            NarrativePattern::RuleInstances => "rule-instances",
        }
    }
}

/// Reviewer-facing role tag of a narrative section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionRole {
    Problem,
    Fix,
    Test,
    Core,
    Supporting,
    Pattern,
    Interface,
    Cleanup,
    /// Any role the schema grows that we don't know yet
    #[serde(other)]
    Other,
}

impl SectionRole {
    pub fn label(&self) -> &'static str {
        match self {
            SectionRole::Problem => "problem",
            SectionRole::Fix => "fix",
            SectionRole::Test => "test",
            SectionRole::Core => "core",
            SectionRole::Supporting => "supporting",
            SectionRole::Pattern => "pattern",
            SectionRole::Interface => "interface",
            SectionRole::Cleanup => "cleanup",
            SectionRole::Other => "other",
        }
    }
}

// ── Classification tree ──

/// A classifier reference to one hunk, with its per-hunk metadata.
/// `collapsed` is the classifier's recommendation; it seeds the mutable
/// collapse state but is never mutated itself, so the original intent stays
/// recoverable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HunkRef {
    pub file: String,
    /// 0-based index into the file's original hunk list
    pub hunk_index: usize,
    pub category: Category,
    #[serde(default)]
    pub collapsed: bool,
    #[serde(default)]
    pub collapse_summary: String,
}

impl HunkRef {
    pub fn key(&self) -> HunkKey {
        HunkKey::new(self.file.clone(), self.hunk_index)
    }
}

/// A narrative grouping of hunks, in reading order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub role: SectionRole,
    pub title: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub hunks: Vec<HunkRef>,
}

/// The full LLM-produced story for one diff. Section order is narrative
/// reading order, not necessarily file order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryClassification {
    #[serde(default)]
    pub change_type: String,
    pub narrative_pattern: NarrativePattern,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub sections: Vec<Section>,
}
