use mdns_common::TraceError;

/// Cursor sobre os tokens de uma linha de trace, separados por espaço.
pub struct Parse<'a> {
    parts: Vec<&'a str>,
    pos: usize,
}

impl<'a> Parse<'a> {
    pub fn new(line: &'a str) -> Parse<'a> {
        Parse {
            parts: line.split_whitespace().collect(),
            pos: 0,
        }
    }

    /// Retorna o próximo token.
    pub fn next_str(&mut self) -> Result<&'a str, TraceError> {
        let part = self
            .parts
            .get(self.pos)
            .copied()
            .ok_or_else(|| TraceError::InvalidArgument("argumentos insuficientes".into()))?;
        self.pos += 1;
        Ok(part)
    }

    /// Retorna o próximo token como u64.
    pub fn next_u64(&mut self) -> Result<u64, TraceError> {
        let s = self.next_str()?;
        s.parse::<u64>()
            .map_err(|_| TraceError::InvalidArgument(format!("'{s}' não é um inteiro")))
    }

    /// Olha o próximo token sem consumir.
    pub fn peek(&self) -> Option<&'a str> {
        self.parts.get(self.pos).copied()
    }

    /// Consome e retorna todos os tokens restantes.
    pub fn rest(&mut self) -> &[&'a str] {
        let start = self.pos.min(self.parts.len());
        self.pos = self.parts.len();
        &self.parts[start..]
    }

    /// Verifica se todos os tokens foram consumidos.
    pub fn finish(&self) -> Result<(), TraceError> {
        if self.has_remaining() {
            Err(TraceError::InvalidArgument(
                "argumentos extras não esperados".into(),
            ))
        } else {
            Ok(())
        }
    }

    pub fn has_remaining(&self) -> bool {
        self.pos < self.parts.len()
    }

    /// Quantos tokens ainda não foram consumidos.
    pub fn remaining(&self) -> usize {
        self.parts.len().saturating_sub(self.pos)
    }
}
