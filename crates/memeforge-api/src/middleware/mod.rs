pub mod client_ip;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use client_ip::{client_ip_middleware, ClientIp, TrustedProxies};
pub use request_id::{get_request_id, request_id_middleware};
pub use session::{session_middleware, SessionConfig, VisitorSession};
