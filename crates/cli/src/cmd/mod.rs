//! CLI command implementations

pub mod check;
pub mod init;
pub mod link;
pub mod restore;
pub mod rollback;
pub mod save;
pub mod status;
pub mod unlink;
