pub mod generation;
pub mod http;
pub mod storage;

pub use generation::SimulatedGenerator;
pub use http::HttpGateway;
pub use storage::{FileStore, MemoryStore};
