pub mod export;
pub mod request;
pub mod response;
pub mod search;
pub mod service;

pub use export::{export_hits, ExportPayload};
pub use request::ConcordanceRequest;
pub use search::{ConcordanceSearch, SearchSettings};
pub use service::{ConcordanceService, HttpConcordanceService};
