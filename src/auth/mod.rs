//! Authentication: registration, email verification, login, tokens.

mod code;
mod handlers;
mod password;
mod service;
mod token;

pub use code::{AlphanumericCodeGenerator, CodeGenerator};
pub use handlers::{login, me, register, verify_email};
pub use password::PasswordHasher;
pub use service::AuthService;
pub use token::{Claims, TokenIssuer};
