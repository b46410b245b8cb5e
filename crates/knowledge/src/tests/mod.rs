//! Shared test doubles and cross-module pipeline scenarios.

pub(crate) mod support;
