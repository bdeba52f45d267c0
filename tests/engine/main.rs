//! Integration tests for Layer 1: Engine
//!
//! Tests for unification, sequence arcs, the knowledge base, and the agenda.

mod agenda;
mod knowledge;
mod sequences;
mod unification;
