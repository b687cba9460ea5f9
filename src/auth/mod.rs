pub mod jwt;

pub use jwt::{verify_jwt, Claims};

#[cfg(test)]
pub use jwt::create_jwt;
