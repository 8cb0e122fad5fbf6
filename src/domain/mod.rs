mod brush;
mod commits;
mod parse;
mod projects;
mod scale;
mod types;

pub use brush::*;
pub use commits::*;
pub use parse::*;
pub use projects::*;
pub use scale::*;
pub use types::*;
