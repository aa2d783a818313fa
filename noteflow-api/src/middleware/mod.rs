/// Middleware modules for the API server
///
/// Authentication middleware lives in `noteflow_shared::auth::middleware`;
/// this module holds middleware specific to the HTTP edge.

pub mod security;
