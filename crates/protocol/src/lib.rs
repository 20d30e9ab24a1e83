#![forbid(unsafe_code)]

mod event;
mod parse;
mod rdata;
mod record;

pub use event::{TimedEvent, TraceEvent};
pub use parse::Parse;
pub use rdata::{
    ARecord, AaaaRecord, PtrRecord, Rdata, RecordData, SrvRecord, TxtRecord, UnknownRecord,
    normalize_domain,
};
pub use record::{Record, parse_type, rtype, type_name, validate_name};
