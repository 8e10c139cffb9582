//! Purchase lifecycle coordination for a toy driving game.
//!
//! The core is the [`service::Coordinator`]: it classifies purchase outcomes
//! from the billing gateway, verifies them against a remote endpoint,
//! consumes them, and grants fuel idempotently, including recovery of
//! purchases left unfinished by prior sessions. Gateway and verifier are
//! trait seams in [`port`]; [`adapter`] holds the reqwest-backed verifier and
//! a scripted in-memory gateway.

pub mod adapter;
pub mod domain;
pub mod port;
pub mod service;
