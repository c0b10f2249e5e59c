mod builder;
mod ordering;

pub use builder::{BuildOutcome, BuildStats, IndexBuilder};
pub use ordering::{sort_mods, FetchedMod};
