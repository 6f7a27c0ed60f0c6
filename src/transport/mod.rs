pub mod http;
pub mod types;

use serde_json::Value;

pub use types::{TransportError, UploadForm};

/// The HTTP seam between the dashboard and the verification backend.
///
/// Implementations return the decoded JSON body of a 2xx response; every
/// other outcome is classified into a [`TransportError`].
pub trait Transport {
    fn post_form(&self, path: &str, form: &UploadForm) -> Result<Value, TransportError>;
    fn post_json(&self, path: &str, body: &Value) -> Result<Value, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn post_form(&self, path: &str, form: &UploadForm) -> Result<Value, TransportError> {
        (**self).post_form(path, form)
    }

    fn post_json(&self, path: &str, body: &Value) -> Result<Value, TransportError> {
        (**self).post_json(path, body)
    }
}
