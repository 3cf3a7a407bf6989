//! Build orchestration and coordination.
//!
//! This module provides the [`Bundler`] orchestrator that takes a
//! [`BuildRequest`](crate::bundler::BuildRequest) through bundle assembly and
//! disk image creation.
//!
//! # Module Organization
//!
//! - [`checksum`] - SHA-256 checksum of the finished artifact
//! - [`orchestrator`] - Main [`Bundler`] struct and build sequencing
//! - [`tool_detection`] - External tool availability checking
//! - [`workspace`] - Scratch workspace owned by one build

pub mod checksum;
mod orchestrator;
pub mod tool_detection;
pub mod workspace;

pub use orchestrator::{BuiltArtifact, Bundler};
