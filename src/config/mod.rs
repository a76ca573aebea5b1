//! Layered configuration system.
//!
//! Resolves settings from, highest precedence first:
//! 1. **Command line** - explicitly supplied flags (plus keyword overrides)
//! 2. **Config files** - every file reachable through `config_files`, in
//!    depth-first discovery order
//! 3. **Defaults** - built-in values for every required key
//! 4. **Parser defaults** - defaults declared by the argument parser
//!
//! ## Resolution
//! Each key takes the value from the first layer that defines it. The result
//! is post-processed into a typed [`Settings`]: level names are parsed,
//! paths are made absolute against the working directory, and the token is
//! read from its file when not given directly.

pub mod args;
mod files;
mod layer;
mod loader;
mod resolve;
mod types;

pub use args::ConfigOverrides;
pub use files::{ConfigFileExpander, absolute_path, load_config_file};
pub use layer::{Layer, LayerSource, LayerStack};
pub use loader::{ConfigLoader, LoadedStack, defaults_layer};
pub use resolve::{Flattened, flatten, post_process};
pub use types::*;
