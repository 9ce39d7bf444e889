//! Gridflow Core - Data model for the gridflow job-graph framework.

mod application;
mod dag;
mod entity;
mod error;
mod identifier;
mod job;
mod resources;

pub use application::{Application, JobSelection};
pub use dag::{CycleError, Dag, Dependency, JobGraph, NodeKey};
pub use entity::{Entity, FileEntity, JsonFile, Validation};
pub use error::{CoreError, EntityError, Result};
pub use identifier::Identifier;
pub use job::Job;
pub use resources::Resources;
