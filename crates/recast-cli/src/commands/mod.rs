pub mod analyze_ops;
pub mod config_ops;
pub mod practice_ops;
