pub mod filter;
pub mod range;
pub mod selector;

pub use filter::QualifierFilter;
pub use range::VersionRange;
pub use selector::{SelectionRequest, Selector, decrement, is_snapshot, release_prefix};
