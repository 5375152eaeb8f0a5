pub mod calculator;
pub mod error;
pub mod historical;
pub mod rates;
pub mod update;
