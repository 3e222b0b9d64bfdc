//! Persistence for users and tasks

pub mod memory;
pub mod traits;

pub use memory::MemoryStorageProvider;
pub use traits::{
    NewTask, NewUser, StorageProvider, StoredTask, StoredUser, TaskStatus, TaskStorage,
    UserStorage,
};
