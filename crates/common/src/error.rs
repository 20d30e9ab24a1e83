/// Erros ao decodificar um registro a partir da forma textual.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("tipo de registro desconhecido: {0}")]
    UnknownType(String),
    #[error("nome inválido: '{0}'")]
    InvalidName(String),
    #[error("TTL inválido: {0}")]
    InvalidTtl(String),
    #[error("classe inválida: {0}")]
    InvalidClass(String),
    #[error("rdata inválido para {rtype}: {reason}")]
    InvalidRdata { rtype: String, reason: String },
}

/// Erros de parsing de linhas do trace de replay.
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    #[error("timestamp inválido: {0}")]
    InvalidTimestamp(String),
    #[error("operação desconhecida: {0}")]
    UnknownOperation(String),
    #[error("número errado de argumentos para '{0}'")]
    WrongArity(String),
    #[error("argumento inválido: {0}")]
    InvalidArgument(String),
    #[error("timestamp {got}ms anterior ao evento anterior ({previous}ms)")]
    OutOfOrder { previous: u64, got: u64 },
    #[error(transparent)]
    Record(#[from] RecordError),
}

/// Erro top-level do mdnscache.
#[derive(Debug, thiserror::Error)]
pub enum MdnsError {
    #[error("linha {line}: {source}")]
    Trace {
        line: usize,
        #[source]
        source: TraceError,
    },
    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),
}

impl MdnsError {
    pub fn at_line(line: usize, source: TraceError) -> Self {
        MdnsError::Trace { line, source }
    }
}

/// Result type alias.
pub type MdnsResult<T> = Result<T, MdnsError>;
