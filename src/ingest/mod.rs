mod payload;
mod service;

pub use payload::ReadingPayload;
pub use service::Ingestor;
