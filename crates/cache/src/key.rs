use std::fmt;

use mdns_protocol::{Record, type_name};

/// Chave do cache: (tipo, nome, desambiguador).
///
/// A ordenação derivada é lexicográfica na ordem dos campos, então todos os
/// registros de um (tipo, nome) formam um intervalo contíguo do mapa.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CacheKey {
    rtype: u16,
    name: String,
    disambiguator: String,
}

impl CacheKey {
    pub fn new(rtype: u16, name: impl Into<String>, disambiguator: impl Into<String>) -> Self {
        Self {
            rtype,
            name: name.into(),
            disambiguator: disambiguator.into(),
        }
    }

    pub fn for_record(record: &Record) -> Self {
        Self::new(
            record.record_type(),
            record.name(),
            record.disambiguator().into_owned(),
        )
    }

    /// Menor chave possível para (tipo, nome), início do scan de intervalo.
    pub(crate) fn lower_bound(rtype: u16, name: &str) -> Self {
        Self::new(rtype, name, String::new())
    }

    pub fn rtype(&self) -> u16 {
        self.rtype
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn disambiguator(&self) -> &str {
        &self.disambiguator
    }

    /// Nome vazio casa com qualquer nome do tipo.
    pub(crate) fn matches(&self, rtype: u16, name: &str) -> bool {
        self.rtype == rtype && (name.is_empty() || self.name == name)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", type_name(self.rtype), self.name)?;
        if !self.disambiguator.is_empty() {
            write!(f, "/{}", self.disambiguator)?;
        }
        Ok(())
    }
}
