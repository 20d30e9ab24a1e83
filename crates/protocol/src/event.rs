use std::time::{Duration, SystemTime};

use mdns_common::{CLASS_IN, RecordError, TraceError};

use crate::record::{Record, parse_type, type_name, validate_name};
use crate::{Parse, RecordData};

/// Evento de um trace de replay.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceEvent {
    /// Registro recebido da rede.
    Update(Record),
    /// Consulta por tipo e nome. Nome vazio casa com todos os nomes do tipo.
    Find { rtype: u16, name: String },
    Cleanup,
    Clear,
}

/// Evento com o instante em que ocorre, em milissegundos desde a época do trace.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedEvent {
    pub offset_ms: u64,
    pub event: TraceEvent,
}

impl TimedEvent {
    /// Faz o parse de uma linha de trace.
    ///
    /// Retorna `Ok(None)` para linhas vazias e comentários (`#`). Registros de `update`
    /// recebem `created_at = epoch + offset`.
    pub fn from_line(line: &str, epoch: SystemTime) -> Result<Option<TimedEvent>, TraceError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let mut parse = Parse::new(line);
        let stamp = parse.next_str()?;
        let offset_ms = stamp
            .parse::<u64>()
            .map_err(|_| TraceError::InvalidTimestamp(stamp.to_string()))?;
        let op = parse
            .next_str()
            .map_err(|_| TraceError::WrongArity("<operação>".into()))?
            .to_lowercase();

        let event = match op.as_str() {
            "update" => parse_update(&mut parse, epoch + Duration::from_millis(offset_ms))?,
            "find" => {
                let rtype = parse_type(arg(&mut parse, "find")?)?;
                if parse.remaining() > 1 {
                    return Err(TraceError::WrongArity("find".into()));
                }
                let name = if parse.has_remaining() {
                    let name = parse.next_str()?;
                    validate_name(name)?;
                    name.to_string()
                } else {
                    String::new()
                };
                TraceEvent::Find { rtype, name }
            }
            "cleanup" => {
                parse.finish()?;
                TraceEvent::Cleanup
            }
            "clear" => {
                parse.finish()?;
                TraceEvent::Clear
            }
            _ => return Err(TraceError::UnknownOperation(op)),
        };

        Ok(Some(TimedEvent { offset_ms, event }))
    }

    /// Converte o evento de volta para a forma de linha.
    pub fn to_line(&self) -> String {
        let mut parts = vec![self.offset_ms.to_string()];
        match &self.event {
            TraceEvent::Update(record) => {
                parts.push("update".into());
                parts.push(type_name(record.record_type()).into_owned());
                parts.push(record.name().to_string());
                parts.push(record.ttl().to_string());
                if record.class() != CLASS_IN {
                    parts.push(format!("class={}", record.class()));
                }
                let rdata = record.rdata().to_string();
                if !rdata.is_empty() {
                    parts.push(rdata);
                }
            }
            TraceEvent::Find { rtype, name } => {
                parts.push("find".into());
                parts.push(type_name(*rtype).into_owned());
                if !name.is_empty() {
                    parts.push(name.clone());
                }
            }
            TraceEvent::Cleanup => parts.push("cleanup".into()),
            TraceEvent::Clear => parts.push("clear".into()),
        }
        parts.join(" ")
    }
}

fn arg<'a>(parse: &mut Parse<'a>, op: &str) -> Result<&'a str, TraceError> {
    parse
        .next_str()
        .map_err(|_| TraceError::WrongArity(op.to_string()))
}

/// `update <TYPE> <name> <ttl> [class=<n>] <rdata...>`
fn parse_update(parse: &mut Parse<'_>, created_at: SystemTime) -> Result<TraceEvent, TraceError> {
    let rtype = parse_type(arg(parse, "update")?)?;
    let name = arg(parse, "update")?;
    let ttl_str = arg(parse, "update")?;
    let ttl = ttl_str
        .parse::<u32>()
        .map_err(|_| RecordError::InvalidTtl(ttl_str.to_string()))?;

    let mut class = CLASS_IN;
    if let Some(token) = parse.peek()
        && let Some(value) = token.strip_prefix("class=")
    {
        class = value
            .parse::<u16>()
            .map_err(|_| RecordError::InvalidClass(value.to_string()))?;
        parse.next_str()?;
    }

    let rdata = RecordData::parse(rtype, parse.rest())?;
    let record = Record::try_new(name, ttl, created_at, rdata)?.with_class(class);
    Ok(TraceEvent::Update(record))
}
