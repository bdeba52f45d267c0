//! Integration tests for Layer 0: Foundation
//!
//! Tests for the core types: Term, TermKind, and Error.

mod errors;
mod terms;
