pub mod attendance;
pub mod department;
pub mod employee;
pub mod summary;
