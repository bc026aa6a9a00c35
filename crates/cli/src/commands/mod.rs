pub mod analyze;
pub mod assemble;
pub mod budget;
pub mod config_cmd;
pub mod normalize;
