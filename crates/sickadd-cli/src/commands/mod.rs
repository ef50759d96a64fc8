pub mod config;
pub mod daemon;
pub mod db;
pub mod run;
