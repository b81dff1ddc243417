//! Domain services: pure mappings between upstream records and the shapes
//! the presentation layer serves.

pub mod calls;
pub mod devices;
pub mod directory;
pub mod phonebook;
