use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::Serialize;

/// Method, headers and body of a gateway call.
///
/// Options are kept by value so the same request can be sent a second time
/// after a token refresh.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: RequestBody,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    /// Serialize `body` as the JSON payload
    pub fn json<T: Serialize + ?Sized>(
        method: Method,
        body: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            method,
            headers: HeaderMap::new(),
            body: RequestBody::Json(serde_json::to_vec(body)?),
        })
    }

    pub fn multipart(method: Method, body: MultipartBody) -> Self {
        Self {
            method,
            headers: HeaderMap::new(),
            body: RequestBody::Multipart(body),
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    /// Pre-serialized JSON
    Json(Vec<u8>),
    Multipart(MultipartBody),
}

impl RequestBody {
    pub fn is_multipart(&self) -> bool {
        matches!(self, RequestBody::Multipart(_))
    }
}

/// Replayable multipart form.
///
/// `reqwest::multipart::Form` is consumed on send, so the parts are kept
/// here and turned into a fresh form for every attempt.
#[derive(Debug, Clone, Default)]
pub struct MultipartBody {
    parts: Vec<MultipartPart>,
}

#[derive(Clone)]
enum MultipartPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        mime_type: String,
        bytes: Vec<u8>,
    },
}

impl std::fmt::Debug for MultipartPart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MultipartPart::Text { name, value } => f
                .debug_struct("Text")
                .field("name", name)
                .field("value", value)
                .finish(),
            MultipartPart::File {
                name,
                file_name,
                mime_type,
                bytes,
            } => f
                .debug_struct("File")
                .field("name", name)
                .field("file_name", file_name)
                .field("mime_type", mime_type)
                .field("len", &bytes.len())
                .finish(),
        }
    }
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(MultipartPart::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.parts.push(MultipartPart::File {
            name: name.into(),
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub(crate) fn to_form(&self) -> reqwest::Result<Form> {
        let mut form = Form::new();
        for part in &self.parts {
            form = match part {
                MultipartPart::Text { name, value } => {
                    form.text(name.clone(), value.clone())
                }
                MultipartPart::File {
                    name,
                    file_name,
                    mime_type,
                    bytes,
                } => {
                    let part = Part::bytes(bytes.clone())
                        .file_name(file_name.clone())
                        .mime_str(mime_type)?;
                    form.part(name.clone(), part)
                }
            };
        }
        Ok(form)
    }
}
