use super::model::{strip_diff_prefix, Diff, DiffLine, FileDiff, FileOp, Hunk, LineType};

/// Parse unified `diff --git` output into structured data
pub fn parse_diff(raw: &str) -> Diff {
    let mut files: Vec<FileDiff> = Vec::new();
    let mut current_file: Option<FileDiff> = None;
    let mut current_hunk: Option<Hunk> = None;
    let mut old_line: usize = 0;
    let mut new_line: usize = 0;

    for line in raw.lines() {
        // New file header: diff --git a/path b/path
        if line.starts_with("diff --git") {
            // Save previous hunk and file
            if let Some(hunk) = current_hunk.take() {
                if let Some(ref mut file) = current_file {
                    file.hunks.push(hunk);
                }
            }
            if let Some(file) = current_file.take() {
                files.push(file);
            }

            let (old_path, new_path) = parse_git_header_paths(line);
            current_file = Some(FileDiff {
                old_path,
                new_path,
                op: FileOp::Modified, // refined by the header lines below
                is_binary: false,
                hunks: Vec::new(),
                adds: 0,
                dels: 0,
            });
            continue;
        }

        // Refine file metadata from extended headers
        if let Some(ref mut file) = current_file {
            if line.starts_with("new file") {
                file.op = FileOp::Added;
                continue;
            }
            if line.starts_with("deleted file") {
                file.op = FileOp::Deleted;
                continue;
            }
            if let Some(old_path) = line.strip_prefix("rename from ") {
                file.op = FileOp::Renamed;
                file.old_path = old_path.to_string();
                continue;
            }
            if let Some(new_path) = line.strip_prefix("rename to ") {
                file.new_path = new_path.to_string();
                continue;
            }
            if let Some(old_path) = line.strip_prefix("copy from ") {
                file.op = FileOp::Copied;
                file.old_path = old_path.to_string();
                continue;
            }
            if let Some(new_path) = line.strip_prefix("copy to ") {
                file.new_path = new_path.to_string();
                continue;
            }
            if line.starts_with("Binary files ") || line.starts_with("GIT binary patch") {
                file.is_binary = true;
                file.hunks.clear();
                current_hunk = None;
                continue;
            }
            // Skip remaining header noise (index, ---, +++, modes, similarity)
            if line.starts_with("index ")
                || line.starts_with("--- ")
                || line.starts_with("+++ ")
                || line.starts_with("similarity index")
                || line.starts_with("dissimilarity index")
                || line.starts_with("old mode")
                || line.starts_with("new mode")
            {
                continue;
            }
        }

        // Hunk header: @@ -old_start,old_count +new_start,new_count @@ label
        if line.starts_with("@@") {
            if let Some(hunk) = current_hunk.take() {
                if let Some(ref mut file) = current_file {
                    file.hunks.push(hunk);
                }
            }

            if let Some(parsed) = parse_hunk_header(line) {
                old_line = parsed.old_start;
                new_line = parsed.new_start;
                current_hunk = Some(parsed);
            }
            continue;
        }

        // Diff content lines
        if let Some(ref mut hunk) = current_hunk {
            if let Some(rest) = line.strip_prefix('+') {
                hunk.lines.push(DiffLine {
                    line_type: LineType::Add,
                    content: rest.to_string(),
                    old_num: None,
                    new_num: Some(new_line),
                });
                new_line += 1;
                if let Some(ref mut file) = current_file {
                    file.adds += 1;
                }
            } else if let Some(rest) = line.strip_prefix('-') {
                hunk.lines.push(DiffLine {
                    line_type: LineType::Delete,
                    content: rest.to_string(),
                    old_num: Some(old_line),
                    new_num: None,
                });
                old_line += 1;
                if let Some(ref mut file) = current_file {
                    file.dels += 1;
                }
            } else if line.starts_with(' ') || line.is_empty() {
                let content = if line.is_empty() {
                    String::new()
                } else {
                    line[1..].to_string()
                };
                hunk.lines.push(DiffLine {
                    line_type: LineType::Context,
                    content,
                    old_num: Some(old_line),
                    new_num: Some(new_line),
                });
                old_line += 1;
                new_line += 1;
            }
            // Skip "\ No newline at end of file"
        }
    }

    // Don't forget the last hunk/file
    if let Some(hunk) = current_hunk {
        if let Some(ref mut file) = current_file {
            file.hunks.push(hunk);
        }
    }
    if let Some(file) = current_file {
        files.push(file);
    }

    Diff { files }
}

/// Extract old/new paths from "diff --git a/path b/path".
/// Paths containing " b/" are ambiguous in this header; the rename/copy
/// extended headers override these values when present.
fn parse_git_header_paths(line: &str) -> (String, String) {
    let rest = line.trim_start_matches("diff --git ").trim();
    if let Some(idx) = rest.find(" b/") {
        let old = strip_diff_prefix(&rest[..idx]).to_string();
        let new = strip_diff_prefix(rest[idx + 1..].trim()).to_string();
        (old, new)
    } else {
        let path = strip_diff_prefix(rest).to_string();
        (path.clone(), path)
    }
}

/// Parse a hunk header like "@@ -10,4 +10,15 @@ fn foo()"
fn parse_hunk_header(line: &str) -> Option<Hunk> {
    let after_first = line.strip_prefix("@@ ")?;
    let end_idx = after_first.find(" @@")?;
    let range_str = &after_first[..end_idx];
    let section_label = after_first[end_idx + 3..].trim().to_string();

    // Parse "-old_start,old_count +new_start,new_count"
    let parts: Vec<&str> = range_str.split_whitespace().collect();
    if parts.len() < 2 {
        return None;
    }

    let (old_start, old_count) = parse_range(parts[0].trim_start_matches('-'))?;
    let (new_start, new_count) = parse_range(parts[1].trim_start_matches('+'))?;

    Some(Hunk {
        old_start,
        old_count,
        new_start,
        new_count,
        section_label,
        lines: Vec::new(),
    })
}

/// Parse "start,count" or just "start" (count defaults to 1)
fn parse_range(s: &str) -> Option<(usize, usize)> {
    if let Some((start, count)) = s.split_once(',') {
        Some((start.parse().ok()?, count.parse().ok()?))
    } else {
        Some((s.parse().ok()?, 1))
    }
}
