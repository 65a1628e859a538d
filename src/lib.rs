//! Client-side in-app-purchase reconciliation.
//!
//! Reconciles three sources of truth (the platform purchase store, the
//! backend entitlement service and a local on-disk cache) into one
//! consistent published view: what the user can buy and what they already
//! own. The [`engine::ReconcileEngine`] is the core; the backend and store
//! clients are trait seams with production and mock implementations.

pub mod backend;
pub mod cache;
pub mod engine;
pub mod model;
pub mod store;

pub use engine::{EngineConfig, EngineState, ReconcileEngine};
