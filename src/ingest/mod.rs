mod ingestor;

pub use ingestor::EventIngestor;
