pub mod git;
pub mod github;
pub mod retention;
pub mod source;
