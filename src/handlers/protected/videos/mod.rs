// handlers/protected/videos/mod.rs - Recording browse and retrieval
//
// Listing and lookup return metadata only; download and bulk-download
// stream file bytes straight from the share.

pub mod bulk_download;
pub mod bulk_request;
pub mod download;
pub mod list;
pub mod search;

pub use bulk_download::bulk_download;
pub use bulk_request::bulk_request;
pub use download::download;
pub use list::list;
pub use search::search;
