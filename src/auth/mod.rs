pub mod claims;
pub mod guard;
pub mod jwt;
pub mod password;
