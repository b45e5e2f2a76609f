//! Library side of the `rcl` command line tool.

pub mod logging;
pub mod pipeline;
pub mod summary;
pub mod workbook;
