//! # Infrastructure Adapters
//!
//! Infrastructure implementations of the image store and messaging gateway
//! interfaces.

pub mod filesystem_image_store;
pub mod line_messaging;

pub use filesystem_image_store::FilesystemImageStore;
