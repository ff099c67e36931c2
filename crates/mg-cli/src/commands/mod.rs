//! CLI command implementations

pub(crate) mod common;
pub(crate) mod init;
pub(crate) mod ls;
pub(crate) mod run;
