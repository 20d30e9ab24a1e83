use std::borrow::Cow;
use std::fmt;
use std::time::SystemTime;

use mdns_common::{CACHE_FLUSH_BIT, CLASS_IN, MAX_NAME_LENGTH, RecordError};

use crate::rdata::{Rdata, RecordData};

/// Códigos de tipo de registro tratados explicitamente.
pub mod rtype {
    pub const A: u16 = 1;
    pub const PTR: u16 = 12;
    pub const TXT: u16 = 16;
    pub const AAAA: u16 = 28;
    pub const SRV: u16 = 33;

    /// Tipos com payload próprio; nunca chegam como `UnknownRecord`.
    pub fn is_handled(code: u16) -> bool {
        matches!(code, A | PTR | TXT | AAAA | SRV)
    }
}

/// Mnemônico do tipo, ou a forma genérica `TYPE<n>` (RFC 3597).
pub fn type_name(record_type: u16) -> Cow<'static, str> {
    match record_type {
        rtype::A => "A".into(),
        rtype::PTR => "PTR".into(),
        rtype::TXT => "TXT".into(),
        rtype::AAAA => "AAAA".into(),
        rtype::SRV => "SRV".into(),
        other => format!("TYPE{other}").into(),
    }
}

/// Inverso de [`type_name`]; mnemônicos sem distinção de caixa.
pub fn parse_type(s: &str) -> Result<u16, RecordError> {
    match s.to_uppercase().as_str() {
        "A" => Ok(rtype::A),
        "PTR" => Ok(rtype::PTR),
        "TXT" => Ok(rtype::TXT),
        "AAAA" => Ok(rtype::AAAA),
        "SRV" => Ok(rtype::SRV),
        upper => upper
            .strip_prefix("TYPE")
            .and_then(|n| n.parse::<u16>().ok())
            .ok_or_else(|| RecordError::UnknownType(s.to_string())),
    }
}

/// Valida um nome de domínio/serviço. Nomes diferenciam maiúsculas de minúsculas.
pub fn validate_name(name: &str) -> Result<(), RecordError> {
    if name.is_empty()
        || name.len() > MAX_NAME_LENGTH
        || name.chars().any(char::is_whitespace)
    {
        return Err(RecordError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Registro já decodificado, imutável depois de criado.
///
/// `created_at` é atribuído por quem produziu o registro, nunca pelo cache.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    name: String,
    class: u16,
    ttl: u32,
    created_at: SystemTime,
    rdata: RecordData,
}

impl Record {
    pub fn new(
        name: impl Into<String>,
        ttl: u32,
        created_at: SystemTime,
        rdata: RecordData,
    ) -> Self {
        Self {
            name: name.into(),
            class: CLASS_IN,
            ttl,
            created_at,
            rdata,
        }
    }

    /// Igual a [`Record::new`], validando o nome.
    pub fn try_new(
        name: impl Into<String>,
        ttl: u32,
        created_at: SystemTime,
        rdata: RecordData,
    ) -> Result<Self, RecordError> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self::new(name, ttl, created_at, rdata))
    }

    pub fn with_class(mut self, class: u16) -> Self {
        self.class = class;
        self
    }

    pub fn record_type(&self) -> u16 {
        self.rdata.record_type()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class(&self) -> u16 {
        self.class
    }

    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    pub fn rdata(&self) -> &RecordData {
        &self.rdata
    }

    pub fn disambiguator(&self) -> Cow<'_, str> {
        self.rdata.disambiguator()
    }

    /// Compara todos os campos exceto `created_at`.
    ///
    /// Com `mdns_class_comparison`, o bit de cache-flush da classe é ignorado.
    pub fn is_equal(&self, other: &Record, mdns_class_comparison: bool) -> bool {
        let mask = if mdns_class_comparison {
            !CACHE_FLUSH_BIT
        } else {
            u16::MAX
        };
        self.name == other.name
            && self.class & mask == other.class & mask
            && self.ttl == other.ttl
            && self.rdata.is_equal(&other.rdata)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.name,
            self.ttl,
            type_name(self.record_type()),
            self.rdata
        )
    }
}
