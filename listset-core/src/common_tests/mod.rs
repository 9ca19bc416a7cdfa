//! Test suites shared by every `ConcurrentSet` implementation.
//!
//! Each suite is a set of generic functions; integration tests instantiate
//! them once per variant (and per guard).

pub mod set_stress_tests;
