//! Storage module for host state persistence

pub mod persistence;
pub mod state;

pub use persistence::{
    load_from_file, save_to_file, Storage, StorageConfig, StorageError, StorageStats,
};
pub use state::{HostState, DEFAULT_FACTORY_LABEL};
