use std::io;

use thiserror::Error;

/// Result type used across the LinkHub core crate.
pub type Result<T> = std::result::Result<T, LinkHubError>;

/// Canonical error representation shared by all layers of the service.
#[derive(Debug, Error)]
pub enum LinkHubError {
    #[error("Erro de I/O: {0}")]
    IoError(#[from] io::Error),

    #[error("Erro de serialização: {0}")]
    SerializationError(String),

    #[error("Erro de deserialização: {0}")]
    DeserializationError(String),

    #[error("Hub não encontrado: {0}")]
    HubNotFound(String),

    #[error("Link não encontrado: {0}")]
    LinkNotFound(String),

    #[error("Usuário não encontrado: {0}")]
    UserNotFound(String),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Não autorizado: {0}")]
    Forbidden(String),

    #[error("Erro de validação: {0}")]
    ValidationError(String),

    #[error("Conflito: {0}")]
    Conflict(String),

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(String),

    #[error("Erro geral: {0}")]
    GeneralError(String),

    #[error("Erro de configuração: {0}")]
    ConfigError(String),
}

impl From<serde_json::Error> for LinkHubError {
    fn from(err: serde_json::Error) -> Self {
        LinkHubError::DeserializationError(err.to_string())
    }
}

impl From<sqlx::Error> for LinkHubError {
    fn from(err: sqlx::Error) -> Self {
        LinkHubError::DatabaseError(err.to_string())
    }
}

impl From<anyhow::Error> for LinkHubError {
    fn from(err: anyhow::Error) -> Self {
        LinkHubError::GeneralError(err.to_string())
    }
}

/// Dedicated configuration error used by the configuration module.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Variável de ambiente obrigatória ausente: {0}")]
    MissingEnvVar(String),

    #[error("Valor inválido para variável de ambiente {key}: {value}")]
    InvalidEnvVar { key: &'static str, value: String },
}

impl From<ConfigError> for LinkHubError {
    fn from(value: ConfigError) -> Self {
        LinkHubError::ConfigError(value.to_string())
    }
}
