pub mod config;
pub mod genre;
pub mod output;
pub mod parse;
pub mod records;
pub mod remote;
pub mod search;
pub mod session;
