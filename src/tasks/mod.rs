//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Maintenance: reaps expired entries and trims to the entry limit

mod maintenance;

pub use maintenance::spawn_maintenance_task;
