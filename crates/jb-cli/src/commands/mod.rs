//! CLI command implementations

pub(crate) mod clear;
pub(crate) mod common;
pub(crate) mod compile;
pub(crate) mod debug;
pub(crate) mod publish;
pub(crate) mod version;
