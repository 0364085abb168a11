pub mod proxy_server;
pub mod relay;
pub mod state;
pub mod uri;
mod error_page;
mod request;

pub use proxy_server::ProxyServer;
pub use relay::{Outcome, relay_transaction};
pub use state::AppState;
pub use uri::{ParsedTarget, decompose};
