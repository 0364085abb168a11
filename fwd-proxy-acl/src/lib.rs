pub mod blocklist;

pub use blocklist::Blocklist;
