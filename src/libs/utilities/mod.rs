// This is the main module file for the `utilities` directory.
// Small, self-contained helpers shared by the installers and the tool manager.

pub mod binary;
pub mod compression;
pub mod path_helpers;
pub mod platform;
pub mod process;
pub mod transport;

#[cfg(test)]
pub mod fakes;
