pub mod backup;
pub mod document;
pub mod kv;
pub mod records;
pub mod settings;

pub use kv::FileStore;
pub use records::RecordStore;
pub use settings::{Settings, SettingsStore};
