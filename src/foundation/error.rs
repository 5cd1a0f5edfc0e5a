pub type SkyscrollResult<T> = Result<T, SkyscrollError>;

#[derive(thiserror::Error, Debug)]
pub enum SkyscrollError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("missing scene node: {0}")]
    MissingNode(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SkyscrollError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn missing_node(what: impl Into<String>) -> Self {
        Self::MissingNode(what.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for SkyscrollError {
    fn from(err: serde_json::Error) -> Self {
        Self::serde(err.to_string())
    }
}
