//! Core contracts for worksim.
//!
//! This crate defines the workspace entity model, the run configuration,
//! the dataset container handed to persistence collaborators, and the
//! integrity validation shared by the engine and its tests.

pub mod config;
pub mod dataset;
pub mod entities;
pub mod error;
pub mod validation;

pub use config::RunConfig;
pub use dataset::Dataset;
pub use entities::{
    Comment, CustomFieldDefinition, CustomFieldValue, Department, FieldType, MembershipRole,
    Organization, Project, ProjectStatus, Section, Tag, Task, TaskTag, Team, TeamMembership, User,
    UserRole,
};
pub use error::{Error, Result};
pub use validation::{IntegrityIssue, validate_dataset};
