mod meta;
mod syntax;
mod tables;

pub use meta::*;
pub use syntax::*;
pub use tables::TypeTables;
