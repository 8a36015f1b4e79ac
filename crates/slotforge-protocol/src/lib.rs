//! Wire types shared between the SlotForge engine and its collaborators.
//!
//! Nothing in this crate performs scheduling. It describes what the
//! surrounding application hands to the engine (a [`catalog::CatalogSnapshot`]
//! and a [`job::GenerateRequest`]) and what it gets back
//! ([`job::TimetableOutput`]).

pub mod catalog;
pub mod config;
pub mod job;
