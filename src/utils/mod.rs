// Shared building blocks for the binary parsers
pub mod buffer;
pub mod encoding;
pub mod synchsafe;

pub use buffer::ByteBuffer;
pub use encoding::TextEncoding;
