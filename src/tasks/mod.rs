//! Background Tasks Module
//!
//! Contains background tasks that run periodically while a cache is in use.
//!
//! # Tasks
//! - Maintenance: removes expired entries from both tiers at a fixed interval

mod maintenance;

pub use maintenance::spawn_maintenance_task;
