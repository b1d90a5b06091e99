#[derive(thiserror::Error, Debug)]
pub enum AuroraError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Secret error: {0}")]
    Secret(String),
    #[error("Connect error: {0}")]
    Connect(String),
    #[error("Transaction error: {0}")]
    Transaction(String),
    #[error("Query error: {0}")]
    Query(String),
    #[error("Scan error: {0}")]
    Scan(String),
    #[error("Serialize error: {0}")]
    Serialize(String),
}

pub type Result<T> = std::result::Result<T, AuroraError>;
