pub mod auth;
pub mod authorize;
pub mod response;
pub mod sensitivity;

pub use auth::{authenticate, AuthUser};
pub use authorize::{ensure_job_access, AnyUser, Managers, Staff};
pub use response::{ApiResponse, ApiResult};
pub use sensitivity::{sensitive_info_toggle, Visibility};
