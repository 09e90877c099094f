//! Stateful threshold checks for Nagios-compatible monitoring.
//!
//! Delta checks persist a counter baseline between invocations and alert on
//! growth; age checks alert on how long ago an external actor last reported
//! progress. Every invocation yields one severity and one status line.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
