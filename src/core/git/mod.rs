pub mod repository;
pub mod validation;

pub use repository::{execute_git_command, GitRepository};
pub use validation::GitValidator;
