//! Replay of a trained model.
//!
//! - Encoding: segment words into subwords by applying merge operations
//! - Decoding: expand subwords back into characters and word breaks

pub mod decoder;
pub mod encoder;

pub use decoder::SubwordDecoder;
pub use encoder::SubwordEncoder;
