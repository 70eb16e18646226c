pub mod claims;
pub mod errors;
pub mod extra;
pub mod handler;

pub use claims::SessionClaims;
pub use claims::TokenKind;
pub use errors::ExtraInfoError;
pub use errors::JwtError;
pub use extra::ExtraInfo;
pub use extra::ExtraValue;
pub use handler::JwtHandler;
pub use handler::SigningAlgorithm;
