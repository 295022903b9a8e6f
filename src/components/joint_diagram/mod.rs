//! JointJS diagrams whose nodes and ports host Leptos views.

mod component;
pub mod engine;
mod error;
pub mod joint;
pub mod markup;
mod options;
mod portal;
pub mod sync;
pub mod translate;
mod types;

pub use component::JointDiagram;
pub use error::DiagramError;
pub use options::PaperOptions;
pub use portal::{AnchorPortal, find_anchor};
pub use types::{DiagramVersion, MagnetMode, NodeDescriptor, PortDescriptor, Position, Size};
