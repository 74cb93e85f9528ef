pub mod filename;
pub mod net;
pub mod normalize;
pub mod time;

pub use normalize::normalize;
