pub mod claims;
pub mod jwt;
pub mod middleware;
pub mod utils;

pub use claims::{Caller, Claims};
pub use jwt::JwtService;
pub use middleware::{AuthMiddleware, AuthenticatedUser};
pub use utils::{require_self_or_staff, require_staff};
