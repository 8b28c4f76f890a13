use crm_domain::error::DomainError;

#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("domain: {0}")]
    Domain(#[source] DomainError),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("handler not registered: request={request}")]
    HandlerNotRegistered { request: &'static str },

    #[error("handler already registered: request={request}")]
    DuplicateHandler { request: &'static str },

    #[error("type mismatch: expected={expected}, found={found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("request cancelled")]
    Cancelled,

    #[error("infra: {0}")]
    Infra(String),
}

impl AppError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

// 取消信号不能被当作普通的领域错误吞掉
impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Cancelled => Self::Cancelled,
            other => Self::Domain(other),
        }
    }
}
