//! Core domain models for sky fixture generation.
//!
//! This module defines the catalog objects, observer frames and horizon
//! positions used throughout the crate, plus the static reference tables.

pub mod domain;
pub mod tables;
