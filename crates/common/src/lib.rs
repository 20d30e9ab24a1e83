#![forbid(unsafe_code)]

mod error;

pub use error::*;

/// Classe DNS IN.
pub const CLASS_IN: u16 = 1;
/// Bit de cache-flush do mDNS, carregado no campo de classe.
pub const CACHE_FLUSH_BIT: u16 = 0x8000;
/// TTL efetivo (segundos) dado a registros com TTL nominal zero.
/// Dá tempo para o host reafirmar o registro (RFC 6762, seção 10.1).
pub const ZERO_TTL_GRACE_SECS: u64 = 1;
pub const MAX_NAME_LENGTH: usize = 255;
