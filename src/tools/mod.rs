//! External tool configuration and executable resolution.
//!
//! Both tools may be installed system-wide or kept next to this binary in a
//! sibling directory, so each logical tool carries an ordered list of
//! candidate locations rather than a single path.

/// Logical name of the volume administration tool.
pub const SHFS_ADMIN: &str = "shfs_admin";
/// Logical name of the domain trigger tool.
pub const CTLTRIGGER: &str = "ctltrigger";
/// Scope addressed by remount triggers unless configured otherwise.
pub const DEFAULT_SCOPE: &str = "minicache";
/// Environment variable carrying a JSON tool configuration override.
pub const TOOLS_ENV: &str = "SHFS_ADD_FILE_TOOLS";
/// Placeholder expanded to the directory of the running executable.
pub const EXE_DIR_PLACEHOLDER: &str = "{exe_dir}";

pub(crate) mod config;
pub(crate) mod resolve;

pub use config::{load_tools_config, ToolsConfig};
pub use resolve::{ResolvedTool, ToolResolver};
