pub mod client;
pub mod lookup;
pub mod offline;
pub mod protocol;

pub use client::HttpLookupClient;
pub use lookup::{LookupClient, LookupError};
pub use offline::OfflineLookupClient;
