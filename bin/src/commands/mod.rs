//! CLI command implementations.

pub(crate) mod load;
pub(crate) mod status;
