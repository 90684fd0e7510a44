// Plugins built from source with `go install`.

use super::GoModule;

/// Last protoc-gen-go-grpc release; the grpc-go repository's latest release is grpc-go itself.
pub const PROTOC_GEN_GO_GRPC_VERSION: &str = "v1.2.0";

// Tags for istio.io/tools are not published as releases.
const ISTIO_TOOLS_VERSION: &str = "1.14.2";

/// Source build of protoc-gen-go-grpc for hosts without a published binary.
pub static PROTOC_GEN_GO_GRPC_SOURCE: GoModule = GoModule {
    name: "protoc-gen-go-grpc",
    repo: "github.com/grpc/grpc-go",
    module: "google.golang.org/grpc/cmd/protoc-gen-go-grpc",
    bare_version: false,
    pinned: Some(PROTOC_GEN_GO_GRPC_VERSION),
};

pub static PROTOC_GEN_VALIDATE: GoModule = GoModule {
    name: "protoc-gen-validate",
    repo: "github.com/envoyproxy/protoc-gen-validate",
    module: "github.com/envoyproxy/protoc-gen-validate",
    bare_version: false,
    pinned: None,
};

pub static PROTOC_GEN_JSONSCHEMA: GoModule = GoModule {
    name: "protoc-gen-jsonschema",
    repo: "github.com/chrusty/protoc-gen-jsonschema",
    module: "github.com/chrusty/protoc-gen-jsonschema/cmd/protoc-gen-jsonschema",
    bare_version: true,
    pinned: None,
};

pub static PROTOC_GEN_DOCS: GoModule = GoModule {
    name: "protoc-gen-docs",
    repo: "github.com/istio/tools",
    module: "istio.io/tools/cmd/protoc-gen-docs",
    bare_version: true,
    pinned: Some(ISTIO_TOOLS_VERSION),
};

pub static PROTOC_GEN_GOLANG_DEEPCOPY: GoModule = GoModule {
    name: "protoc-gen-golang-deepcopy",
    repo: "github.com/istio/tools",
    module: "istio.io/tools/cmd/protoc-gen-golang-deepcopy",
    bare_version: true,
    pinned: Some(ISTIO_TOOLS_VERSION),
};

pub static PROTOC_GEN_GOLANG_JSONSHIM: GoModule = GoModule {
    name: "protoc-gen-golang-jsonshim",
    repo: "github.com/istio/tools",
    module: "istio.io/tools/cmd/protoc-gen-golang-jsonshim",
    bare_version: true,
    pinned: Some(ISTIO_TOOLS_VERSION),
};

pub static PROTOC_GEN_GOGOFAST: GoModule = GoModule {
    name: "protoc-gen-gogofast",
    repo: "github.com/gogo/protobuf",
    module: "github.com/gogo/protobuf/protoc-gen-gogofast",
    bare_version: false,
    pinned: None,
};

pub static PROTOC_GEN_CONNECT_GO: GoModule = GoModule {
    name: "protoc-gen-connect-go",
    repo: "github.com/bufbuild/connect-go",
    module: "github.com/bufbuild/connect-go/cmd/protoc-gen-connect-go",
    bare_version: false,
    pinned: None,
};
