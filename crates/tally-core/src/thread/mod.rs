pub mod materialize;
pub mod walker;

pub use materialize::materialize;
pub use walker::ThreadWalker;
