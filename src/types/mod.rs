//! Core types for the journey kernel.

pub mod edge;
pub mod journey;
pub mod node;
pub mod persona;

pub use edge::{Edge, EdgeKey, EdgeType};
pub use journey::{
    ConversionPoint, EntryPoint, JourneyDiagnostics, JourneyPath, PersonaJourney,
};
pub use node::{tokenize, url_path, url_path_depth, AttrValue, Node, NodeId, NodeType};
pub use persona::{CatalogError, JourneyStage, Persona, PersonaCatalog};
