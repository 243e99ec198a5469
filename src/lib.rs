//! XP Cadence - Pathway progression and recurring objective windows
//!
//! Pathways earn XP from completed objectives. A pathway may carry a cadence:
//! a calendar-aligned window (daily, weekly or monthly) that must see a set
//! number of objectives completed to keep its streak alive. This crate holds
//! the window math, the cycle lifecycle, the background sweep that rolls
//! expired windows over, and reconfiguration of a running cadence.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
