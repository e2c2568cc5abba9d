pub mod traits;
pub mod debug_buffer;

pub use traits::{DebugVertex, DrawContext, ImageId, Topology};
