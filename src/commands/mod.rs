// Register the actions the `protog` binary and library can perform.

// Prints the tool cache location.
pub mod cache_dir;
// Provisions tools and runs protoc.
pub mod run;
