//! Route paths (axum syntax).

pub const GET_API_HEALTH: &str = "/api/health";
pub const POST_API_REGISTER: &str = "/api/register";
pub const POST_API_LOGIN: &str = "/api/login";
pub const POST_API_REFRESH: &str = "/api/refresh";
pub const POST_API_LOGOUT: &str = "/api/logout";
pub const POST_API_LOGOUT_ALL: &str = "/api/logout-all";
pub const GET_API_SESSION_STATUS: &str = "/api/session-status";
pub const POST_API_USERS_EMAIL_ELEVATE: &str = "/api/users/{email}/elevate";
pub const POST_API_RESPONSES: &str = "/api/responses";
pub const GET_API_RETAKE_STATUS: &str = "/api/users/{email}/quizzes/{quiz}/retake";
pub const POST_API_RETAKE_START: &str = "/api/users/{email}/quizzes/{quiz}/retake/start";
pub const POST_API_RETAKE_COMPLETE: &str = "/api/users/{email}/quizzes/{quiz}/retake/complete";
pub const GET_API_PASSWORD_RESET_CHECK: &str = "/api/password-reset/check/{email}";
pub const POST_API_PASSWORD_RESET: &str = "/api/password-reset/reset";
