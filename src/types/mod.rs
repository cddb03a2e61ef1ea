//! Core types: typed kinematic vectors, ring buffers, labels and records

pub mod labels;
pub mod records;
pub mod ring;
pub mod spaces;
