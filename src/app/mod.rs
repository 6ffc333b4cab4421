mod filter;
mod positions;
mod state;

pub use filter::SectionView;
pub use positions::Positions;
pub use state::{App, InputMode};
