pub mod middleware;
pub mod token_validator;

pub use middleware::auth_middleware;
pub use token_validator::TokenValidator;
