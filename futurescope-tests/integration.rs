//! Integration tests for Futurescope
//!
//! Drive the whole resolution pipeline against scripted search providers and
//! canned pages, checking the contracts callers rely on.

#[path = "integration/fixtures.rs"]
mod fixtures;

#[path = "integration/pipeline_scenarios.rs"]
mod pipeline_scenarios;

#[path = "integration/cascade_fallbacks.rs"]
mod cascade_fallbacks;

#[path = "integration/concurrent_calls.rs"]
mod concurrent_calls;
