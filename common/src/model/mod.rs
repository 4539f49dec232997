pub mod cell;
pub mod import;
pub mod operation_log;
pub mod ranking;
pub mod series;
