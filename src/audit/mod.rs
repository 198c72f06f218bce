pub mod activity_builder;
pub mod activity_logger;

pub use activity_builder::ActivityBuilder;
pub use activity_logger::ActivityLogger;
