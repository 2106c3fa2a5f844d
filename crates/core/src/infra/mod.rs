pub mod audio;
pub mod metrics;
pub mod model;
pub mod prompts;
