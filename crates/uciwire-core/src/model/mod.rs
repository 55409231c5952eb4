// ── Domain model ──
//
// Canonical types for configuration data as the overlay sees it,
// independent of the JSON-RPC wire shapes in `uciwire-api`.

pub mod change;
pub mod section;
pub mod section_ref;
pub mod value;

pub use change::{Change, ChangeOp};
pub use section::Section;
pub use section_ref::SectionRef;
pub use value::OptionValue;
