mod authenticator;
mod flight;

pub use authenticator::{Authenticator, Credentials, TOKEN_PATH, TokenResponse};
pub use flight::SingleFlight;
