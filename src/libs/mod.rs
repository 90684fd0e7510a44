// Core engine: version resolution, the tool manager that provisions descriptors, and the
// proto include resolver.

pub mod includes;
pub mod paths;
pub mod tool_manager;
pub mod utilities;
pub mod version_resolver;
