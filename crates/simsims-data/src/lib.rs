//! SimSims Data -- configuration files and the save directory.
//!
//! - [`loader`] reads `simsims.{ron,toml,json}` into a [`SimsConfig`].
//! - [`save_store`] writes and reads numbered JSON saves.

pub mod config;
pub mod loader;
pub mod save_store;

pub use config::{SimsConfig, Surface};
pub use loader::{DataLoadError, find_config, load_config};
pub use save_store::{SaveStore, SaveStoreError};
