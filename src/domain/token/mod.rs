//! Token domain - stateless identity tokens

mod codec;
mod payload;

pub use codec::TokenCodec;
pub use payload::TokenPayload;
