//! # Spotmap Shared
//! This crate defines the domain data structures and types used across the
//! spotmap core. It includes common definitions for spots, valuations, users,
//! sport types and user contributions.
pub mod types;
