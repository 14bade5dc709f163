//! Domain models

pub mod file;
pub mod operation;
pub mod parameters;

pub use file::{FileSlot, UploadedFile};
pub use operation::{Action, LogDescriptor, Operation, OperationFilter, OperationState};
pub use parameters::{OperationParameters, VersionRule};
