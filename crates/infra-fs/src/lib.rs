// Jobdock Infrastructure - Filesystem Adapter
// Implements: FileStorage

pub mod local_storage;

pub use local_storage::LocalFileStorage;
