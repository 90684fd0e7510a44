pub mod targets;

use clap::Parser;
use std::path::PathBuf;

/// Command line for `protog`.
///
/// protog's own options must come first. Everything after them, including options protog
/// does not know, is handed to protoc unchanged:
///
/// ```text
/// protog --debug --go_out=gen/go -Iprotos protos/service.proto
/// ```
#[derive(Debug, Parser)]
#[command(name = "protog", version)]
#[command(about = "Runs protoc, provisioning it and the plugins the command line asks for")]
pub struct Cli {
    /// Enables detailed debug output for troubleshooting.
    #[arg(short, long)]
    pub debug: bool,

    /// Optional YAML file with tool versions and the includes directory.
    #[arg(long, env = "PROTOG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Where imported third-party protos are downloaded to [default: build/proto-includes].
    #[arg(long)]
    pub includes_dir: Option<PathBuf>,

    /// Prints the directory tools are cached in and exits.
    #[arg(long)]
    pub print_cache_dir: bool,

    /// Arguments passed to protoc.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, num_args = 0..)]
    pub protoc_args: Vec<String>,
}
