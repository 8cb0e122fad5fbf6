mod github;
mod loc;
mod projects;

pub use github::*;
pub use loc::*;
pub use projects::*;
