pub mod debug_dump;
pub mod http_client;

pub use debug_dump::DebugDump;
pub use http_client::{PageFetcher, ReqwestHttp};
