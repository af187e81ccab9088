//! Configuration: config files, config arrays and per-file resolution.

mod array;
mod file;
mod loader;
mod object;

pub use array::{ConfigArray, ConfigStatus, DEFAULT_FILES, DEFAULT_IGNORES, ResolvedConfig};
pub use file::{CONFIG_FILE_NAMES, parse_config, read_config_file};
pub use loader::{ConfigLoader, find_config_file};
pub use object::{ConfigObject, GlobalAccess, LanguageOptions, LinterOptions, RuleSetting};
