// Library target exists for the criterion benchmarks and the integration
// tests; the binary entry point is main.rs. This file re-declares the data
// modules so harnesses can import types via `quizdr::bank::*` /
// `quizdr::store::*`. Most code is only exercised through the binary, so
// suppress dead_code warnings.
#![allow(dead_code)]

pub mod bank;
pub mod store;
pub mod tabbar;
