//! Lorebound Core - Core types and utilities for the spell engine
//!
//! This crate provides the foundational types shared by the engine:
//! - Actor and item identifiers
//! - Tick clock for converting between game seconds and ticks
//! - Deferred and periodic task scheduler (the tick driver)

pub mod time;
pub mod types;

pub use glam::Vec3;
pub use time::{Scheduler, TaskHandle, Tick, TickClock, TickConfig};
pub use types::{ActorId, ItemId};
