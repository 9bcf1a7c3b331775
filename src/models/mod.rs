pub mod exercise;
pub mod output;
pub mod request;
