pub mod datetime;
pub mod pii;

pub use pii::Masked;
