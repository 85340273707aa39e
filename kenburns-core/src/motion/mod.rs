pub mod crop;
pub mod ease;
pub mod path;
pub mod transform;
pub mod viewport;
