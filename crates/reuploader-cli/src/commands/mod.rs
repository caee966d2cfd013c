//! Command handlers grouped by concern.

pub(crate) mod batch;
pub(crate) mod config;
pub(crate) mod interactive;
pub(crate) mod reupload;
pub(crate) mod scan;
pub(crate) mod session;
