// Output targets: maps each protoc `--<x>_out` flag to the tool that serves it and to any
// explicit plugin wiring protoc needs, and scans a protoc argument list for enabled targets,
// their output directories and the input `.proto` files.

use crate::tools::ToolId;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Explicit `--plugin=<name>=<path>` wiring for plugins whose executable name does not follow
/// protoc's `protoc-gen-<x>` lookup convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PluginWiring {
    /// Name protoc looks up for the target (`protoc-gen-grpc_cpp`).
    pub plugin: &'static str,
    /// Logical executable registered by the providing tool (`grpc_cpp_plugin`).
    pub executable: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct OutputTarget {
    /// Flag stem without dashes, e.g. `go_out`.
    pub flag: &'static str,
    /// Tool to provision, `None` for generators built into protoc.
    pub tool: Option<ToolId>,
    pub plugin: Option<PluginWiring>,
}

const fn builtin(flag: &'static str) -> OutputTarget {
    OutputTarget { flag, tool: None, plugin: None }
}

const fn plugin(flag: &'static str, tool: ToolId) -> OutputTarget {
    OutputTarget { flag, tool: Some(tool), plugin: None }
}

const fn wired(flag: &'static str, tool: ToolId, plugin: &'static str, executable: &'static str) -> OutputTarget {
    OutputTarget {
        flag,
        tool: Some(tool),
        plugin: Some(PluginWiring { plugin, executable }),
    }
}

pub static OUTPUT_TARGETS: [OutputTarget; 34] = [
    builtin("cpp_out"),
    builtin("csharp_out"),
    builtin("java_out"),
    builtin("js_out"),
    builtin("objc_out"),
    builtin("php_out"),
    builtin("python_out"),
    builtin("ruby_out"),
    wired("grpc_cpp_out", ToolId::ProtocGenGrpc, "protoc-gen-grpc_cpp", "grpc_cpp_plugin"),
    wired("grpc_csharp_out", ToolId::ProtocGenGrpc, "protoc-gen-grpc_csharp", "grpc_csharp_plugin"),
    wired("grpc_objc_out", ToolId::ProtocGenGrpc, "protoc-gen-grpc_objc", "grpc_objective_c_plugin"),
    wired("grpc_js_out", ToolId::ProtocGenGrpc, "protoc-gen-grpc_js", "grpc_node_plugin"),
    wired("grpc_php_out", ToolId::ProtocGenGrpc, "protoc-gen-grpc_php", "grpc_php_plugin"),
    wired("grpc_python_out", ToolId::ProtocGenGrpc, "protoc-gen-grpc_python", "grpc_python_plugin"),
    wired("grpc_ruby_out", ToolId::ProtocGenGrpc, "protoc-gen-grpc_ruby", "grpc_ruby_plugin"),
    plugin("go_out", ToolId::ProtocGenGo),
    plugin("go-grpc_out", ToolId::ProtocGenGoGrpc),
    plugin("grpc-java_out", ToolId::ProtocGenGrpcJava),
    plugin("gogofast_out", ToolId::ProtocGenGogoFast),
    plugin("doc_out", ToolId::ProtocGenDoc),
    plugin("docs_out", ToolId::ProtocGenDocs),
    plugin("connect-es_out", ToolId::ProtocGenConnectEs),
    plugin("es_out", ToolId::ProtocGenEs),
    plugin("grpc-gateway_out", ToolId::ProtocGenGrpcGateway),
    plugin("grpc-web_out", ToolId::ProtocGenGrpcWeb),
    plugin("ts_out", ToolId::ProtocGenTs),
    wired("improbable_ts_out", ToolId::TsProtocGen, "protoc-gen-improbable_ts", "ts-protoc-gen"),
    plugin("golang-deepcopy_out", ToolId::ProtocGenGolangDeepCopy),
    plugin("jsonschema_out", ToolId::ProtocGenJsonSchema),
    plugin("golang-jsonshim_out", ToolId::ProtocGenGolangJsonShim),
    plugin("connect-go_out", ToolId::ProtocGenConnectGo),
    plugin("validate_out", ToolId::ProtocGenValidate),
    // Accepted by protoc-gen-go-grpc / protoc-gen-grpc-gateway under these names too.
    plugin("go_grpc_out", ToolId::ProtocGenGoGrpc),
    plugin("grpc_gateway_out", ToolId::ProtocGenGrpcGateway),
];

pub fn find_target(flag: &str) -> Option<&'static OutputTarget> {
    OUTPUT_TARGETS.iter().find(|t| t.flag == flag)
}

// Short options that take a value, possibly as the following argument.
const SHORT_VALUE_FLAGS: [&str; 2] = ["-I", "-o"];

// Long options (besides `--*_out` / `--*_opt`) that take a value.
const LONG_VALUE_FLAGS: [&str; 10] = [
    "proto_path",
    "descriptor_set_out",
    "descriptor_set_in",
    "dependency_out",
    "error_format",
    "plugin",
    "encode",
    "decode",
    "experimental_editions",
    "edition_defaults_out",
];

/// What a protoc argument list asks for.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ScannedArgs {
    /// Tools to provision, in provisioning order. Always contains [`ToolId::Protoc`].
    pub tools: BTreeSet<ToolId>,
    /// Plugin wiring to inject, each at most once.
    pub plugins: BTreeSet<PluginWiring>,
    /// Directories to create for the enabled targets.
    pub out_dirs: Vec<PathBuf>,
    /// Input `.proto` files.
    pub protos: Vec<PathBuf>,
}

/// The directory part of an `--x_out` value, which may be prefixed with `OPTIONS:`.
/// A Windows drive letter colon is not treated as the separator.
pub fn out_dir_of(value: &str) -> &str {
    let Some(idx) = value.rfind(':') else {
        return value;
    };
    let bytes = value.as_bytes();
    let is_drive = idx >= 1
        && bytes[idx - 1].is_ascii_alphabetic()
        && (idx == 1 || bytes[idx - 2] == b':')
        && matches!(bytes.get(idx + 1), Some(b'\\') | Some(b'/'));
    match (is_drive, idx) {
        (true, 1) => value,
        (true, _) => &value[idx - 1..],
        (false, _) => &value[idx + 1..],
    }
}

/// Directory to create before protoc runs for an `--x_out` destination. protoc writes
/// `.jar` and `.zip` destinations as a single archive, so only their parent is needed.
pub fn dir_to_create(out: &str) -> Option<PathBuf> {
    let lower = out.to_ascii_lowercase();
    let dir = if lower.ends_with(".jar") || lower.ends_with(".zip") {
        Path::new(out).parent()?
    } else {
        Path::new(out)
    };
    if dir.as_os_str().is_empty() {
        None
    } else {
        Some(dir.to_path_buf())
    }
}

fn takes_value(long: &str) -> bool {
    long.ends_with("_out") || long.ends_with("_opt") || LONG_VALUE_FLAGS.contains(&long)
}

/// Scans protoc arguments for enabled output targets and input files.
pub fn scan(args: &[String]) -> ScannedArgs {
    let mut scanned = ScannedArgs::default();
    scanned.tools.insert(ToolId::Protoc);

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if let Some(long) = arg.strip_prefix("--") {
            let (name, value) = match long.split_once('=') {
                Some((name, value)) => (name, Some(value.to_string())),
                None if takes_value(long) => (long, iter.next().cloned()),
                None => (long, None),
            };
            if let (Some(target), Some(value)) = (find_target(name), value) {
                scanned.tools.extend(target.tool);
                scanned.plugins.extend(target.plugin);
                scanned.out_dirs.extend(dir_to_create(out_dir_of(&value)));
            }
        } else if SHORT_VALUE_FLAGS.contains(&arg.as_str()) {
            iter.next();
        } else if !arg.starts_with('-') && arg.ends_with(".proto") {
            scanned.protos.push(PathBuf::from(arg));
        }
    }
    scanned
}
