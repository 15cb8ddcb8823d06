pub mod config;
pub mod ontology;
pub mod rerank;
pub mod retrieval;
pub mod search;

pub use config::{Config, RetrievalConfig, RetrievalOverrides};
pub use retrieval::{Concept, ConceptResult, Node};
pub use search::{SearchError, SearchPipeline, SearchRequest, SearchResponse};
