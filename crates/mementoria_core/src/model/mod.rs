//! Scrapbook domain model.
//!
//! # Responsibility
//! - Define the canonical scrapbook/page/item structures used by core logic.
//! - Provide constructors that uphold structural invariants.
//!
//! # Invariants
//! - Every domain object is identified by a stable UUID.
//! - A scrapbook always owns at least one page.
//! - Nothing is physically deleted; collections only grow.

pub mod scrapbook;
