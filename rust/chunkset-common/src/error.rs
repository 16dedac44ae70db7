use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn index_out_of_range(index: usize, len: usize) -> Error {
        Error(ErrorKind::IndexOutOfRange { index, len }.into())
    }

    pub fn invalid_format(element: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidFormat {
                element: element.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    /// Wraps a stream failure.
    ///
    /// A premature end of stream is reported as [`ErrorKind::InvalidFormat`] for
    /// `context`: the declared layout promised more bytes than the stream holds.
    /// Any other I/O failure is surfaced unchanged as [`ErrorKind::Io`].
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Error {
        let context = context.into();
        if source.kind() == std::io::ErrorKind::UnexpectedEof {
            return Error(
                ErrorKind::InvalidFormat {
                    element: context,
                    message: format!("truncated stream: {source}"),
                }
                .into(),
            );
        }
        Error(ErrorKind::Io { context, source }.into())
    }

    /// Returns `true` if this is a malformed or truncated input error.
    pub fn is_format_error(&self) -> bool {
        matches!(self.kind(), ErrorKind::InvalidFormat { .. })
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("index {index} out of range (len: {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("invalid storage format for '{element}': {message}")]
    InvalidFormat { element: String, message: String },

    #[error("IO error for '{context}': {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}
