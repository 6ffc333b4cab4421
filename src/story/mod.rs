mod collapse;
mod lookup;
mod model;
mod validate;

pub use collapse::CollapseState;
pub use lookup::LookupMaps;
pub use model::{
    Category, HunkKey, HunkRef, NarrativePattern, Section, SectionRole, StoryClassification,
};
pub use validate::{validate_classification, ValidationError, ValidationReason};
