use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::diff::{parse_diff, Diff};
use crate::story::StoryClassification;

/// One review case: a raw diff plus the classifier's output for it.
/// Loaded from a JSON file; the classification is optional so cases can be
/// reviewed before the classifier has run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewCase {
    pub id: String,
    #[serde(default)]
    pub repo: String,
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub base_commit: String,
    #[serde(default)]
    pub head_commit: String,
    pub diff: String,
    #[serde(default)]
    pub classification: Option<StoryClassification>,
}

/// A case loaded into memory, with its parsed diff and source path
pub struct LoadedCase {
    pub case: ReviewCase,
    pub diff: Diff,
    pub path: PathBuf,
    /// SHA-256 of the raw diff, compared against judgment hashes
    pub diff_hash: String,
}

/// Compute SHA-256 hash of a raw diff (for judgment staleness detection)
pub fn compute_diff_hash(raw_diff: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw_diff.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Load a single case file
pub fn load_case(path: &Path) -> Result<LoadedCase> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read case file {}", path.display()))?;
    let case: ReviewCase = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse case file {}", path.display()))?;
    let diff = parse_diff(&case.diff);
    let diff_hash = compute_diff_hash(&case.diff);
    Ok(LoadedCase {
        case,
        diff,
        path: path.to_path_buf(),
        diff_hash,
    })
}

/// Load cases from a mix of file and directory arguments. Directories are
/// scanned non-recursively for `.json` files; unparseable files inside a
/// directory are skipped with a warning, while explicit file arguments fail.
pub fn load_cases(paths: &[String]) -> Result<Vec<LoadedCase>> {
    let mut cases = Vec::new();
    for arg in paths {
        let path = Path::new(arg);
        if path.is_dir() {
            let mut entries: Vec<PathBuf> = std::fs::read_dir(path)
                .with_context(|| format!("Failed to read directory {}", path.display()))?
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| {
                    p.extension().map_or(false, |ext| ext == "json")
                        && !p
                            .file_name()
                            .map_or(false, |n| n.to_string_lossy().starts_with(".sr-"))
                })
                .collect();
            entries.sort();
            for entry in entries {
                match load_case(&entry) {
                    Ok(case) => cases.push(case),
                    Err(e) => log::warn!("Skipping {}: {}", entry.display(), e),
                }
            }
        } else {
            cases.push(load_case(path)?);
        }
    }
    if cases.is_empty() {
        anyhow::bail!("No review cases found");
    }
    Ok(cases)
}

// ── Judgments ──

/// Reviewer verdict on a classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Pass => "PASS",
            Verdict::Fail => "FAIL",
        }
    }
}

/// One persisted judgment, keyed by case ID
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Judgment {
    pub case_id: String,
    pub verdict: Verdict,
    #[serde(default)]
    pub critique: String,
    /// SHA-256 of the diff the judgment was made against
    pub diff_hash: String,
    #[serde(default)]
    pub timestamp: String,
}

/// On-disk judgment sidecar format (`.sr-judgments.json`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgmentFile {
    pub version: u32,
    #[serde(default)]
    pub judgments: Vec<Judgment>,
}

impl Default for JudgmentFile {
    fn default() -> Self {
        JudgmentFile {
            version: 1,
            judgments: Vec::new(),
        }
    }
}

/// Path of the judgment sidecar next to a case file
pub fn judgments_path(case_path: &Path) -> PathBuf {
    case_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(".sr-judgments.json")
}

/// Load the judgment sidecar for a case file's directory. Missing file is an
/// empty set; a malformed file is replaced with an empty set after a warning.
pub fn load_judgments(case_path: &Path) -> JudgmentFile {
    let path = judgments_path(case_path);
    match std::fs::read_to_string(&path) {
        Ok(content) => match serde_json::from_str::<JudgmentFile>(&content) {
            Ok(file) => file,
            Err(e) => {
                log::warn!("Failed to parse {}: {}", path.display(), e);
                JudgmentFile::default()
            }
        },
        Err(_) => JudgmentFile::default(),
    }
}

/// Record a judgment, replacing any existing judgment for the same case ID.
/// Written atomically via a temp file rename.
pub fn save_judgment(case_path: &Path, judgment: Judgment) -> Result<()> {
    let path = judgments_path(case_path);
    let mut file = load_judgments(case_path);
    file.judgments.retain(|j| j.case_id != judgment.case_id);
    file.judgments.push(judgment);

    let json = serde_json::to_string_pretty(&file)?;
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, &json)
        .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
    std::fs::rename(&tmp_path, &path)
        .with_context(|| format!("Failed to rename into {}", path.display()))?;
    Ok(())
}

/// Find the stored judgment for a case, with a staleness flag: a judgment
/// made against a different diff hash is stale, not invalid.
pub fn judgment_for<'a>(
    file: &'a JudgmentFile,
    case_id: &str,
    current_hash: &str,
) -> Option<(&'a Judgment, bool)> {
    file.judgments
        .iter()
        .find(|j| j.case_id == case_id)
        .map(|j| (j, j.diff_hash != current_hash))
}

pub fn timestamp_now() -> String {
    // Seconds since epoch; enough for ordering without a chrono dependency
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    secs.to_string()
}
