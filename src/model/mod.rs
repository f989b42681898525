pub mod attendance;
pub mod faculty;
pub mod holiday;
pub mod leave_application;
pub mod lock;
pub mod settings;
pub mod summary;
pub mod user;

/// Employee id, the faculty primary key.
pub type EmpId = u64;
