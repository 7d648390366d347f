//! Domain types and models

pub mod http;
pub mod scheduling;
pub mod secret;

pub use http::{HeaderValue, HttpHeader, HttpMethod, HttpRequest, HttpResponse};
pub use scheduling::{TaskFailure, TaskId, TaskKind, TickReport};
pub use secret::SecretHandle;
