//! MySQL repository implementations.

pub mod audit_log_repository_impl;
pub mod session_repository_impl;
pub mod token_repository_impl;
pub mod user_directory_impl;

pub use audit_log_repository_impl::MySqlAuditLogRepository;
pub use session_repository_impl::MySqlSessionRepository;
pub use token_repository_impl::MySqlRefreshTokenRepository;
pub use user_directory_impl::MySqlUserDirectory;
