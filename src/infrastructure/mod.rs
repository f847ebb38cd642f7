// Infrastructure implementations for Errhound.

pub mod concurrency;
pub mod flow_resolver;
pub mod graph_loader;

pub use flow_resolver::FlowValueResolver;
pub use graph_loader::{load_artifacts, GraphModule};
