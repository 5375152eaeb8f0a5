pub mod banxico;
pub mod cache;
pub mod calculations;
pub mod db;
pub mod updater;
