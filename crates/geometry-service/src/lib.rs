pub mod config;
pub mod dispatch;
pub mod error;
pub mod extract;
pub mod registry;
pub mod service;
pub mod session;

pub use config::ServiceConfig;
pub use dispatch::{
    dispatch, dispatch_envelope, GeometryRequest, GeometryResponse, RequestEnvelope,
    ResponseEnvelope,
};
pub use error::{ServiceError, StatusCode};
pub use registry::{ShapeRecord, ShapeRegistry};
pub use service::GeometryService;
pub use session::{ClientSession, RequestContext, SessionManager, CLIENT_ID_METADATA_KEY};
