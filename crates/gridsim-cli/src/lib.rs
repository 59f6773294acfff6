// Library root: re-exports the CLI modules so integration tests can drive the
// same loading and reporting path as the binary.

pub mod config;
pub mod gamelog;
pub mod report;
