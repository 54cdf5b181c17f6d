pub mod aws;
pub mod identity;
pub mod process;
pub mod secrets;
