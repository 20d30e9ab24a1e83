use std::borrow::Cow;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use bytes::Bytes;
use mdns_common::RecordError;

use crate::record::{rtype, type_name, validate_name};

/// Capacidade comum a todo payload de registro.
pub trait Rdata {
    fn record_type(&self) -> u16;

    /// Componente secundário da chave de cache.
    ///
    /// Permite que vários registros do mesmo (tipo, nome) coexistam. O padrão é vazio:
    /// tipos que não sobrescrevem só admitem um registro vivo por nome.
    fn disambiguator(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    /// Igualdade de payload usada para decidir entre `Changed` e `NoChange`.
    fn is_equal(&self, other: &Self) -> bool;
}

/// Remove o ponto raiz final, se houver.
pub fn normalize_domain(domain: &str) -> &str {
    domain.strip_suffix('.').unwrap_or(domain)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ARecord(pub Ipv4Addr);

impl Rdata for ARecord {
    fn record_type(&self) -> u16 {
        rtype::A
    }

    fn is_equal(&self, other: &Self) -> bool {
        self == other
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AaaaRecord(pub Ipv6Addr);

impl Rdata for AaaaRecord {
    fn record_type(&self) -> u16 {
        rtype::AAAA
    }

    fn is_equal(&self, other: &Self) -> bool {
        self == other
    }
}

/// Ponteiro para uma instância de serviço (ex.: `_http._tcp.local` → `web._http._tcp.local`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PtrRecord {
    pub domain: String,
}

impl Rdata for PtrRecord {
    fn record_type(&self) -> u16 {
        rtype::PTR
    }

    fn disambiguator(&self) -> Cow<'_, str> {
        Cow::Borrowed(normalize_domain(&self.domain))
    }

    /// O ponto raiz final não conta, como na chave.
    fn is_equal(&self, other: &Self) -> bool {
        normalize_domain(&self.domain) == normalize_domain(&other.domain)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrvRecord {
    pub priority: u16,
    pub weight: u16,
    pub port: u16,
    pub target: String,
}

impl Rdata for SrvRecord {
    fn record_type(&self) -> u16 {
        rtype::SRV
    }

    fn is_equal(&self, other: &Self) -> bool {
        self == other
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxtRecord {
    pub texts: Vec<Bytes>,
}

impl Rdata for TxtRecord {
    fn record_type(&self) -> u16 {
        rtype::TXT
    }

    fn is_equal(&self, other: &Self) -> bool {
        self.texts == other.texts
    }
}

/// Payload opaco de um tipo sem tratamento específico.
///
/// O desambiguador é vazio, então só um registro vivo por (tipo, nome). Os tipos de
/// [`rtype`] são recusados em [`UnknownRecord::new`]: um PTR opaco colidiria com os
/// PTR tipados do mesmo nome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRecord {
    rtype: u16,
    data: Bytes,
}

impl UnknownRecord {
    pub fn new(record_type: u16, data: impl Into<Bytes>) -> Result<Self, RecordError> {
        if rtype::is_handled(record_type) {
            return Err(RecordError::InvalidRdata {
                rtype: type_name(record_type).into_owned(),
                reason: "tipo com payload próprio não pode ser opaco".to_string(),
            });
        }
        Ok(Self {
            rtype: record_type,
            data: data.into(),
        })
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

impl Rdata for UnknownRecord {
    fn record_type(&self) -> u16 {
        self.rtype
    }

    fn is_equal(&self, other: &Self) -> bool {
        self.rtype == other.rtype && self.data == other.data
    }
}

/// Payload tipado de um registro.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordData {
    A(ARecord),
    Aaaa(AaaaRecord),
    Ptr(PtrRecord),
    Srv(SrvRecord),
    Txt(TxtRecord),
    Unknown(UnknownRecord),
}

impl RecordData {
    pub fn ptr(domain: impl Into<String>) -> Self {
        RecordData::Ptr(PtrRecord {
            domain: domain.into(),
        })
    }

    pub fn srv(priority: u16, weight: u16, port: u16, target: impl Into<String>) -> Self {
        RecordData::Srv(SrvRecord {
            priority,
            weight,
            port,
            target: target.into(),
        })
    }

    pub fn txt<I, T>(texts: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Bytes>,
    {
        RecordData::Txt(TxtRecord {
            texts: texts.into_iter().map(Into::into).collect(),
        })
    }

    /// Faz o parse da forma textual do payload para o tipo dado.
    pub fn parse(record_type: u16, tokens: &[&str]) -> Result<RecordData, RecordError> {
        let invalid = |reason: String| RecordError::InvalidRdata {
            rtype: type_name(record_type).into_owned(),
            reason,
        };
        let single = |tokens: &[&str]| -> Result<String, RecordError> {
            match tokens {
                [one] => Ok((*one).to_string()),
                _ => Err(invalid(format!("esperado 1 campo, recebido {}", tokens.len()))),
            }
        };

        match record_type {
            rtype::A => {
                let s = single(tokens)?;
                let addr = s
                    .parse::<Ipv4Addr>()
                    .map_err(|_| invalid(format!("endereço IPv4 inválido: {s}")))?;
                Ok(RecordData::A(ARecord(addr)))
            }
            rtype::AAAA => {
                let s = single(tokens)?;
                let addr = s
                    .parse::<Ipv6Addr>()
                    .map_err(|_| invalid(format!("endereço IPv6 inválido: {s}")))?;
                Ok(RecordData::Aaaa(AaaaRecord(addr)))
            }
            rtype::PTR => {
                let domain = single(tokens)?;
                validate_name(&domain)?;
                Ok(RecordData::ptr(domain))
            }
            rtype::SRV => {
                let [priority, weight, port, target] = tokens else {
                    return Err(invalid(format!(
                        "esperado 4 campos, recebido {}",
                        tokens.len()
                    )));
                };
                let number = |s: &str| {
                    s.parse::<u16>()
                        .map_err(|_| invalid(format!("'{s}' não é um u16")))
                };
                validate_name(target)?;
                Ok(RecordData::srv(
                    number(*priority)?,
                    number(*weight)?,
                    number(*port)?,
                    *target,
                ))
            }
            rtype::TXT => Ok(RecordData::txt(
                tokens.iter().map(|t| Bytes::copy_from_slice(t.as_bytes())),
            )),
            other => Ok(RecordData::Unknown(UnknownRecord::new(
                other,
                tokens.join(" "),
            )?)),
        }
    }
}

impl Rdata for RecordData {
    fn record_type(&self) -> u16 {
        match self {
            RecordData::A(r) => r.record_type(),
            RecordData::Aaaa(r) => r.record_type(),
            RecordData::Ptr(r) => r.record_type(),
            RecordData::Srv(r) => r.record_type(),
            RecordData::Txt(r) => r.record_type(),
            RecordData::Unknown(r) => r.record_type(),
        }
    }

    fn disambiguator(&self) -> Cow<'_, str> {
        match self {
            RecordData::A(r) => r.disambiguator(),
            RecordData::Aaaa(r) => r.disambiguator(),
            RecordData::Ptr(r) => r.disambiguator(),
            RecordData::Srv(r) => r.disambiguator(),
            RecordData::Txt(r) => r.disambiguator(),
            RecordData::Unknown(r) => r.disambiguator(),
        }
    }

    fn is_equal(&self, other: &Self) -> bool {
        match (self, other) {
            (RecordData::A(a), RecordData::A(b)) => a.is_equal(b),
            (RecordData::Aaaa(a), RecordData::Aaaa(b)) => a.is_equal(b),
            (RecordData::Ptr(a), RecordData::Ptr(b)) => a.is_equal(b),
            (RecordData::Srv(a), RecordData::Srv(b)) => a.is_equal(b),
            (RecordData::Txt(a), RecordData::Txt(b)) => a.is_equal(b),
            (RecordData::Unknown(a), RecordData::Unknown(b)) => a.is_equal(b),
            _ => false,
        }
    }
}

impl fmt::Display for RecordData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordData::A(ARecord(addr)) => write!(f, "{addr}"),
            RecordData::Aaaa(AaaaRecord(addr)) => write!(f, "{addr}"),
            RecordData::Ptr(r) => write!(f, "{}", r.domain),
            RecordData::Srv(r) => {
                write!(f, "{} {} {} {}", r.priority, r.weight, r.port, r.target)
            }
            RecordData::Txt(r) => {
                let texts: Vec<_> = r.texts.iter().map(|t| String::from_utf8_lossy(t)).collect();
                write!(f, "{}", texts.join(" "))
            }
            RecordData::Unknown(r) => write!(f, "{}", String::from_utf8_lossy(&r.data)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ptr_disambiguator_is_normalized_target() {
        assert_eq!(RecordData::ptr("x.local.").disambiguator(), "x.local");
        assert_eq!(RecordData::ptr("x.local").disambiguator(), "x.local");
    }

    #[test]
    fn other_types_have_empty_disambiguator() {
        let a = RecordData::parse(rtype::A, &["10.0.0.1"]).unwrap();
        let srv = RecordData::srv(0, 0, 80, "host.local");
        let unknown = RecordData::parse(99, &["abc"]).unwrap();
        assert_eq!(a.disambiguator(), "");
        assert_eq!(srv.disambiguator(), "");
        assert_eq!(unknown.disambiguator(), "");
    }

    #[test]
    fn ptr_equality_ignores_root_dot() {
        let plain = RecordData::ptr("x.local");
        let rooted = RecordData::ptr("x.local.");
        assert!(plain.is_equal(&rooted));
        assert!(rooted.is_equal(&plain));
        assert!(!plain.is_equal(&RecordData::ptr("y.local.")));
    }

    #[test]
    fn unknown_rejects_handled_types() {
        assert!(matches!(
            UnknownRecord::new(rtype::PTR, "x.local"),
            Err(RecordError::InvalidRdata { .. })
        ));
        let opaque = UnknownRecord::new(99, "abc").unwrap();
        assert_eq!(opaque.record_type(), 99);
        assert_eq!(opaque.data().as_ref(), b"abc");
    }

    #[test]
    fn srv_equality_includes_port() {
        let a = RecordData::srv(0, 0, 80, "host.local");
        let b = RecordData::srv(0, 0, 8080, "host.local");
        assert!(a.is_equal(&a.clone()));
        assert!(!a.is_equal(&b));
    }

    #[test]
    fn different_variants_are_never_equal() {
        let ptr = RecordData::ptr("host.local");
        let unknown = RecordData::parse(12_000, &["host.local"]).unwrap();
        assert!(!ptr.is_equal(&unknown));
    }

    #[test]
    fn parse_each_type() {
        assert_eq!(
            RecordData::parse(rtype::A, &["192.168.1.2"]).unwrap(),
            RecordData::A(ARecord(Ipv4Addr::new(192, 168, 1, 2)))
        );
        assert_eq!(
            RecordData::parse(rtype::AAAA, &["fe80::1"]).unwrap(),
            RecordData::Aaaa(AaaaRecord("fe80::1".parse().unwrap()))
        );
        assert_eq!(
            RecordData::parse(rtype::SRV, &["0", "5", "631", "printer.local"]).unwrap(),
            RecordData::srv(0, 5, 631, "printer.local")
        );
        assert_eq!(
            RecordData::parse(rtype::TXT, &["path=/", "v=1"]).unwrap(),
            RecordData::txt(["path=/", "v=1"])
        );
        assert_eq!(
            RecordData::parse(rtype::TXT, &[]).unwrap(),
            RecordData::txt(Vec::<Bytes>::new())
        );
    }

    #[test]
    fn parse_rejects_bad_payloads() {
        assert!(matches!(
            RecordData::parse(rtype::A, &["300.1.1.1"]),
            Err(RecordError::InvalidRdata { .. })
        ));
        assert!(matches!(
            RecordData::parse(rtype::PTR, &[]),
            Err(RecordError::InvalidRdata { .. })
        ));
        assert!(matches!(
            RecordData::parse(rtype::SRV, &["0", "0", "99999", "host.local"]),
            Err(RecordError::InvalidRdata { .. })
        ));
    }

    #[test]
    fn display_presentation_form() {
        assert_eq!(RecordData::srv(1, 2, 3, "h.local").to_string(), "1 2 3 h.local");
        assert_eq!(RecordData::txt(["a=1", "b"]).to_string(), "a=1 b");
    }
}
