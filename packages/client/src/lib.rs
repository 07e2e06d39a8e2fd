pub mod error;
pub mod hash;
pub mod http;
pub mod inplace;
pub mod path;
pub mod record;
pub mod session;

pub use error::{RemoteError, UploadError};
pub use http::HttpSession;
pub use inplace::register_inplace;
pub use record::{FileAnnotation, FileRecord};
pub use session::Session;
