mod dag;
mod model;
mod script;

pub use dag::DagExecuteParams;
pub use model::ModelStoreParams;
pub use script::{ScriptExecuteParams, ScriptStoreParams};
