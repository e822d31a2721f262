pub mod accounts;
pub mod ai;
pub mod institutes;
pub mod proctor;
pub mod projects;
