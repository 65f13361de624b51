//! Core pipeline orchestration and domain logic for folio.
//!
//! This crate ties together discovery, loading, rendering, and assembly into
//! the README pipeline, and hosts the collaborators built on top of it: the
//! chat assistant, profile deploy, and project sync.

pub mod assembler;
pub mod chat;
pub mod deploy;
pub mod loader;
pub mod pipeline;
pub mod projects;
pub mod toc;
