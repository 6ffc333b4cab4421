mod model;
mod parse;

pub use model::{strip_diff_prefix, Diff, DiffLine, FileDiff, FileOp, Hunk, LineType};
pub use parse::parse_diff;
