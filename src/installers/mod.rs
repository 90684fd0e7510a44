// This module groups the acquisition strategies. Each one materializes a tool into its cache
// directory and registers what it contributes to the toolchain.

/// Direct download of prebuilt release archives and bare binaries.
pub(crate) mod url;

/// `npm install` of packages into a per-tool prefix, after provisioning Node.js.
pub(crate) mod npm;

/// `go install` of plugins built from source, after provisioning Go.
pub(crate) mod go;
