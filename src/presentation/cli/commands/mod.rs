pub mod age;
pub mod config;
pub mod delta;
pub mod run;
