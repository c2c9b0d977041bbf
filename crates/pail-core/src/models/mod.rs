mod object;
mod presign;

pub use object::{ObjectEntry, ObjectMetadata};
pub use presign::PresignMethod;
