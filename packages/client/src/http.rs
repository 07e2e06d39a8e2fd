use std::fs::File;
use std::io;
use std::path::Path;

use reqwest::Method;
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response, multipart};
use serde_json::json;
use tracing::debug;

use crate::error::RemoteError;
use crate::record::{FileAnnotation, FileRecord};
use crate::session::Session;

/// Blocking HTTP implementation of [`Session`] against the server's REST
/// API.
///
/// Requests carry bearer-token auth when a token is configured. No retries
/// and no timeouts beyond the client defaults.
pub struct HttpSession {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpSession {
    pub fn connect(base_url: impl Into<String>, token: Option<String>) -> Result<Self, RemoteError> {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.request(method, url);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        req
    }

    /// Maps a non-2xx response to [`RemoteError::Api`] with the body as the
    /// message.
    fn check(res: Response) -> Result<Response, RemoteError> {
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }
        let message = res.text().unwrap_or_default();
        Err(RemoteError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

impl Session for HttpSession {
    fn create_record_from_bytes(
        &self,
        directory: &str,
        name: &str,
        content: &[u8],
        mimetype: &str,
    ) -> Result<FileRecord, RemoteError> {
        debug!("POST /api/files ({name}, {} bytes)", content.len());
        let res = self
            .request(Method::POST, "/api/files")
            .query(&[
                ("directory", directory),
                ("name", name),
                ("mimetype", mimetype),
            ])
            .body(content.to_vec())
            .send()?;
        Ok(Self::check(res)?.json()?)
    }

    fn get_record(&self, id: i64) -> Result<FileRecord, RemoteError> {
        let res = self
            .request(Method::GET, &format!("/api/files/{id}"))
            .send()?;
        if res.status() == StatusCode::NOT_FOUND {
            return Err(RemoteError::NotFound(id));
        }
        Ok(Self::check(res)?.json()?)
    }

    fn save_record(&self, record: &FileRecord) -> Result<(), RemoteError> {
        let res = self
            .request(Method::PUT, &format!("/api/files/{}", record.id))
            .json(record)
            .send()?;
        Self::check(res)?;
        Ok(())
    }

    fn delete_record(&self, record: &FileRecord) -> Result<(), RemoteError> {
        let res = self
            .request(Method::DELETE, &format!("/api/files/{}", record.id))
            .send()?;
        Self::check(res)?;
        Ok(())
    }

    fn upload(&self, path: &Path, mimetype: &str) -> Result<FileRecord, RemoteError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "path has no file name")
            })?;

        debug!("POST /api/files/upload ({name})");
        let file = File::open(path)?;
        let part = multipart::Part::reader(file)
            .file_name(name)
            .mime_str(mimetype)?;
        let form = multipart::Form::new().part("file", part);

        let res = self
            .request(Method::POST, "/api/files/upload")
            .multipart(form)
            .send()?;
        Ok(Self::check(res)?.json()?)
    }

    fn create_annotation(
        &self,
        file_id: i64,
        namespace: &str,
    ) -> Result<FileAnnotation, RemoteError> {
        let res = self
            .request(Method::POST, "/api/annotations")
            .json(&json!({ "file_id": file_id, "namespace": namespace }))
            .send()?;
        Ok(Self::check(res)?.json()?)
    }
}
