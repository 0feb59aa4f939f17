//! Database query functions organized by table.

pub mod seasons;
pub mod status;
