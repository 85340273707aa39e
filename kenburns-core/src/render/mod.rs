pub mod frames;
pub mod pipeline;
pub mod store;
