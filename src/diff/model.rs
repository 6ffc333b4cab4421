/// A single line in a diff hunk
#[derive(Debug, Clone)]
pub struct DiffLine {
    pub line_type: LineType,
    pub content: String,
    /// Old-side line number (None for added lines)
    pub old_num: Option<usize>,
    /// New-side line number (None for deleted lines)
    pub new_num: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineType {
    Context,
    Add,
    Delete,
}

impl LineType {
    pub fn prefix(&self) -> &'static str {
        match self {
            LineType::Add => "+",
            LineType::Delete => "-",
            LineType::Context => " ",
        }
    }
}

/// File change operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOp {
    Modified,
    Added,
    Deleted,
    Renamed,
    Copied,
}

impl FileOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            FileOp::Added => "+",
            FileOp::Modified => "~",
            FileOp::Deleted => "-",
            FileOp::Renamed => "R",
            FileOp::Copied => "C",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FileOp::Added => "added",
            FileOp::Modified => "modified",
            FileOp::Deleted => "deleted",
            FileOp::Renamed => "renamed",
            FileOp::Copied => "copied",
        }
    }
}

/// A diff hunk with range info and lines
#[derive(Debug, Clone)]
pub struct Hunk {
    pub old_start: usize,
    pub old_count: usize,
    pub new_start: usize,
    pub new_count: usize,
    /// Trailing context from the `@@` header (usually the enclosing function)
    pub section_label: String,
    pub lines: Vec<DiffLine>,
}

impl Hunk {
    /// The canonical `@@ -a,b +c,d @@` range header (no trailing label)
    pub fn range_header(&self) -> String {
        format!(
            "@@ -{},{} +{},{} @@",
            self.old_start, self.old_count, self.new_start, self.new_count
        )
    }

    /// Range header with the section label appended, as rendered in the diff area
    pub fn display_header(&self) -> String {
        if self.section_label.is_empty() {
            self.range_header()
        } else {
            format!("{} {}", self.range_header(), self.section_label)
        }
    }

    /// Format this hunk as plain text (for export)
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        text.push_str(&self.range_header());
        text.push('\n');
        for line in &self.lines {
            text.push_str(line.line_type.prefix());
            text.push_str(&line.content);
            text.push('\n');
        }
        text
    }
}

/// A file with its diff hunks and metadata
#[derive(Debug, Clone)]
pub struct FileDiff {
    pub old_path: String,
    pub new_path: String,
    pub op: FileOp,
    pub is_binary: bool,
    pub hunks: Vec<Hunk>,
    pub adds: usize,
    pub dels: usize,
}

impl FileDiff {
    /// The path shown to the reviewer: new path, except deleted files show
    /// the old path. `a/`/`b/` prefixes are stripped at parse time, but strip
    /// again here so hand-built values behave the same.
    pub fn display_path(&self) -> &str {
        let path = match self.op {
            FileOp::Deleted => {
                if self.old_path.is_empty() {
                    &self.new_path
                } else {
                    &self.old_path
                }
            }
            _ => {
                if self.new_path.is_empty() {
                    &self.old_path
                } else {
                    &self.new_path
                }
            }
        };
        strip_diff_prefix(path)
    }

    /// Whether this file produces any rendered output at all.
    ///
    /// Binary files are never rendered. Files with no hunks are only shown
    /// when the operation itself is the information (add/delete of an empty
    /// file, or a rename/copy). Mode-only changes contribute nothing.
    pub fn is_renderable(&self) -> bool {
        if self.is_binary {
            return false;
        }
        !self.hunks.is_empty()
            || matches!(
                self.op,
                FileOp::Added | FileOp::Deleted | FileOp::Renamed | FileOp::Copied
            )
    }
}

/// Strip a leading `a/` or `b/` prefix from a git diff path
pub fn strip_diff_prefix(path: &str) -> &str {
    path.strip_prefix("a/")
        .or_else(|| path.strip_prefix("b/"))
        .unwrap_or(path)
}

/// A full parsed diff: ordered files, each with ordered hunks
#[derive(Debug, Clone, Default)]
pub struct Diff {
    pub files: Vec<FileDiff>,
}

impl Diff {
    /// Files that pass the render-eligibility rule, in source order
    pub fn renderable_files(&self) -> impl Iterator<Item = &FileDiff> {
        self.files.iter().filter(|f| f.is_renderable())
    }

    /// Total add/delete counts across all files
    pub fn stats(&self) -> (usize, usize) {
        self.files
            .iter()
            .fold((0, 0), |(a, d), f| (a + f.adds, d + f.dels))
    }

    /// The widest line number anywhere in the diff, used to size the gutter.
    /// Minimum width is 4 so gutters align across the whole document.
    pub fn gutter_width(&self) -> usize {
        let mut max_num = 0usize;
        for file in &self.files {
            for hunk in &file.hunks {
                for line in &hunk.lines {
                    if let Some(n) = line.old_num {
                        max_num = max_num.max(n);
                    }
                    if let Some(n) = line.new_num {
                        max_num = max_num.max(n);
                    }
                }
            }
        }
        let mut width = 1;
        let mut n = max_num;
        while n >= 10 {
            width += 1;
            n /= 10;
        }
        width.max(4)
    }
}
