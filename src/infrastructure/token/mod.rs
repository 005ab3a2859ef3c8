//! Token codec implementations

mod sealed;

pub use sealed::AesGcmTokenCodec;
