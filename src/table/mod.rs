pub mod error;
pub mod io;
pub mod merge;
pub mod select;
