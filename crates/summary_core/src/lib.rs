pub mod authz;
pub mod domain;
pub mod format;
pub mod memory;
pub mod ports;
pub mod service;
pub mod view;

pub use authz::{authorize, Access};
pub use domain::{CallerContext, Document, NewDocument, RegenerationOptions, Summary, SummaryKind, User};
pub use ports::{DatabaseService, PortError, PortResult, SummaryPipelineService};
pub use service::{DocumentService, ServiceError, ServiceResult, UploadedFile};
