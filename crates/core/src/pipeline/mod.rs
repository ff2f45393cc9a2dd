pub mod batch_executor;
pub mod infrastructure;
pub mod locate_and_align_use_case;
pub mod pipeline_logger;
