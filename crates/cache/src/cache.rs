use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::time::{Duration, SystemTime};

use tracing::{debug, trace};

use mdns_common::ZERO_TTL_GRACE_SECS;
use mdns_protocol::Record;

use crate::key::CacheKey;

/// Resultado de [`MdnsCache::update_record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    /// Já existia um registro igual (exceto `created_at`) sob a mesma chave.
    NoChange,
    Added,
    /// Já existia um registro diferente sob a mesma chave.
    Changed,
}

/// Parâmetros do cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// TTL efetivo de registros com TTL zero ("goodbye").
    pub zero_ttl_grace: Duration,
    /// Ignora o bit de cache-flush da classe ao comparar registros.
    pub mdns_class_comparison: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            zero_ttl_grace: Duration::from_secs(ZERO_TTL_GRACE_SECS),
            mdns_class_comparison: true,
        }
    }
}

/// Cache de registros mDNS com expiração preguiçosa por TTL.
///
/// Nada expira sozinho: registros vencidos ficam invisíveis para
/// [`find_records`](Self::find_records) mas só saem do mapa em
/// [`cleanup_records`](Self::cleanup_records). O tempo atual é sempre passado pelo
/// chamador.
///
/// `next_expiration`, quando definido, nunca é posterior à menor expiração
/// efetiva entre os registros guardados. Inserções só o abaixam; a varredura o
/// recalcula.
///
/// Não é thread-safe por conta própria: quem compartilha o cache entre threads
/// serializa o acesso (ex.: `Mutex<MdnsCache>`).
#[derive(Debug, Default)]
pub struct MdnsCache {
    records: BTreeMap<CacheKey, Record>,
    next_expiration: Option<SystemTime>,
    config: CacheConfig,
}

impl MdnsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            records: BTreeMap::new(),
            next_expiration: None,
            config,
        }
    }

    /// Remove todos os registros sem notificar ninguém.
    pub fn clear(&mut self) {
        self.next_expiration = None;
        self.records.clear();
    }

    /// Insere ou substitui o registro sob sua chave.
    ///
    /// O registro novo sempre substitui o antigo, mesmo quando o resultado é
    /// `NoChange`: o `created_at` guardado passa a ser o do registro novo.
    pub fn update_record(&mut self, record: Record) -> UpdateKind {
        let key = CacheKey::for_record(&record);

        if let Some(expiration) = self.effective_expiration(&record)
            && self.next_expiration.is_none_or(|next| expiration < next)
        {
            self.next_expiration = Some(expiration);
        }

        let kind = match self.records.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(record);
                UpdateKind::Added
            }
            Entry::Occupied(mut slot) => {
                let kind = if record.is_equal(slot.get(), self.config.mdns_class_comparison) {
                    UpdateKind::NoChange
                } else {
                    UpdateKind::Changed
                };
                slot.insert(record);
                kind
            }
        };

        trace!("update_record: {kind:?}");
        kind
    }

    /// Remove os registros expirados em `now`, chamando `on_removed` uma vez para cada.
    ///
    /// Retorna imediatamente se `now` ainda não alcançou `next_expiration`, então
    /// pode ser chamado com frequência. Os removidos são visitados na ordem das
    /// chaves. Se `on_removed` entrar em pânico a varredura fica parcial: parte dos
    /// registros já saiu e `next_expiration` mantém o valor anterior.
    pub fn cleanup_records<F>(&mut self, now: SystemTime, mut on_removed: F)
    where
        F: FnMut(&Record),
    {
        if let Some(next) = self.next_expiration
            && now < next
        {
            return;
        }

        let grace = self.config.zero_ttl_grace;
        let mut next_expiration: Option<SystemTime> = None;
        let before = self.records.len();

        self.records.retain(|_, record| match effective_expiration(record, grace) {
            Some(expiration) if now >= expiration => {
                on_removed(record);
                false
            }
            Some(expiration) => {
                if next_expiration.is_none_or(|next| expiration < next) {
                    next_expiration = Some(expiration);
                }
                true
            }
            None => true,
        });

        self.next_expiration = next_expiration;
        debug!(
            "varredura removeu {} registros, {} restantes, próxima expiração: {:?}",
            before - self.records.len(),
            self.records.len(),
            self.next_expiration
        );
    }

    /// Registros vivos em `now` do tipo e nome dados, na ordem das chaves.
    ///
    /// `name` vazio casa com todos os nomes do tipo.
    pub fn find_records(&self, rtype: u16, name: &str, now: SystemTime) -> Vec<&Record> {
        self.records
            .range(CacheKey::lower_bound(rtype, name)..)
            .take_while(|(key, _)| key.matches(rtype, name))
            .map(|(_, record)| record)
            .filter(|record| {
                self.effective_expiration(record)
                    .is_none_or(|expiration| now < expiration)
            })
            .collect()
    }

    pub fn get(&self, key: &CacheKey) -> Option<&Record> {
        self.records.get(key)
    }

    /// Todos os registros guardados, inclusive vencidos ainda não varridos.
    pub fn iter(&self) -> impl Iterator<Item = (&CacheKey, &Record)> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Limite inferior conservador da próxima expiração; `None` quando não definido.
    ///
    /// Registros que nunca expiram não entram no cálculo.
    pub fn next_expiration(&self) -> Option<SystemTime> {
        self.next_expiration
    }

    /// `created_at + ttl`, com TTL zero tratado como o período de graça.
    ///
    /// `None` quando a soma não cabe em `SystemTime`: o registro nunca expira.
    pub fn effective_expiration(&self, record: &Record) -> Option<SystemTime> {
        effective_expiration(record, self.config.zero_ttl_grace)
    }
}

fn effective_expiration(record: &Record, zero_ttl_grace: Duration) -> Option<SystemTime> {
    let ttl = match record.ttl() {
        0 => zero_ttl_grace,
        secs => Duration::from_secs(u64::from(secs)),
    };
    record.created_at().checked_add(ttl)
}
