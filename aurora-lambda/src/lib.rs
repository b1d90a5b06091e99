mod handler;
mod response;

pub use handler::Handler;
pub use response::{encode_body, html_escape, InvocationResponse, CONTENT_TYPE_JSON};
