pub mod http;

pub use http::{router, start_server, AppState};
