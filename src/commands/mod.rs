pub mod init;
pub mod list;
pub mod lock;
pub mod search;
pub mod vendor;
