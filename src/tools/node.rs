// Plugins published to npm. Each is installed into its own prefix under the cache root.

use super::NodePackage;

pub static PROTOC_GEN_TS: NodePackage = NodePackage {
    name: "protoc-gen-ts",
    package: "protoc-gen-ts",
    repo: "github.com/thesayyn/protoc-gen-ts",
    on_path: true,
    executable: None,
};

// Ships a `protoc-gen-ts` shim too. Kept off PATH so `--ts_out` keeps resolving to the
// package above, and wired explicitly through `--plugin=protoc-gen-improbable_ts`.
pub static TS_PROTOC_GEN: NodePackage = NodePackage {
    name: "ts-protoc-gen",
    package: "ts-protoc-gen",
    repo: "github.com/improbable-eng/ts-protoc-gen",
    on_path: false,
    executable: Some(("ts-protoc-gen", "protoc-gen-ts")),
};

pub static PROTOC_GEN_ES: NodePackage = NodePackage {
    name: "protoc-gen-es",
    package: "@bufbuild/protoc-gen-es",
    repo: "github.com/bufbuild/protobuf-es",
    on_path: true,
    executable: None,
};

pub static PROTOC_GEN_CONNECT_ES: NodePackage = NodePackage {
    name: "protoc-gen-connect-es",
    package: "@bufbuild/protoc-gen-connect-es",
    repo: "github.com/bufbuild/connect-es",
    on_path: true,
    executable: None,
};
