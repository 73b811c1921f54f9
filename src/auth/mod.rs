pub mod middleware;
pub mod token;

pub use middleware::{BEARER_SCHEME, authorize, bearer_token, require_auth};
pub use token::{Claims, DecodedToken, TOKEN_TTL_MINUTES, TokenCodec, TokenError};
