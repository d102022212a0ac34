//! Builtin tools bound to specialist agents

mod approval;
mod graph_query;
mod incidents;
mod knowledge;
mod vector_search;

pub use approval::ApprovalGateTool;
pub use graph_query::{GraphQueryTool, QueryType};
pub use incidents::{DiscoverIncidentsTool, IncidentTimelineTool};
pub use knowledge::{ExtractPatternTool, ProposeKnowledgeUpdateTool};
pub use vector_search::VectorSearchTool;
