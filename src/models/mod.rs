//! Data models for the matrix dashboard

pub mod level;
pub mod matrix;
pub mod notification;
pub mod transaction;
pub mod user;

pub use level::*;
pub use matrix::*;
pub use notification::*;
pub use transaction::*;
pub use user::*;
