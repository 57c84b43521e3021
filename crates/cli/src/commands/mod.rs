pub mod build;
pub mod fix;
pub mod init;
pub mod preview;
pub mod validate;
