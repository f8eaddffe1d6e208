pub mod request_id;
pub mod viewer;

pub use request_id::{make_span_with_request_id, request_id_middleware, RequestId};
pub use viewer::ViewerId;
