pub mod boolean;
pub mod offset;
