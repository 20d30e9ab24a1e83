use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::time::{Duration, SystemTime};

use mdns_cache::{CacheKey, MdnsCache, UpdateKind};
use mdns_protocol::{ARecord, Record, RecordData, rtype};

const NAMES: [&str; 4] = ["a.local", "b.local", "c.local", "d.local"];
const TARGETS: [&str; 3] = ["x.local", "y.local", "z.local"];

fn epoch() -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000)
}

fn random_record(rng: &mut fastrand::Rng, now: SystemTime) -> Record {
    let name = NAMES[rng.usize(..NAMES.len())];
    let ttl = rng.u32(0..8);
    let rdata = match rng.u8(..3) {
        0 => RecordData::A(ARecord(Ipv4Addr::new(10, 0, 0, rng.u8(1..3)))),
        1 => RecordData::ptr(TARGETS[rng.usize(..TARGETS.len())]),
        _ => RecordData::srv(0, 0, rng.u16(80..82), "host.local"),
    };
    Record::new(name, ttl, now, rdata)
}

/// Oráculo de força bruta: expiração efetiva de cada registro guardado.
fn true_min_expiration(cache: &MdnsCache) -> Option<SystemTime> {
    cache
        .iter()
        .filter_map(|(_, record)| cache.effective_expiration(record))
        .min()
}

fn expired(cache: &MdnsCache, record: &Record, now: SystemTime) -> bool {
    cache
        .effective_expiration(record)
        .is_some_and(|expiration| expiration <= now)
}

fn assert_watermark_sound(cache: &MdnsCache) {
    if let (Some(mark), Some(min)) = (cache.next_expiration(), true_min_expiration(cache)) {
        assert!(mark <= min, "marca {mark:?} posterior ao mínimo real {min:?}");
    }
    if true_min_expiration(cache).is_some() {
        assert!(cache.next_expiration().is_some());
    }
}

#[test]
fn randomized_operations_keep_invariants() {
    for seed in 0..64 {
        let mut rng = fastrand::Rng::with_seed(seed);
        let mut cache = MdnsCache::new();
        // modelo: chave -> registro, o último escrito vence
        let mut model: HashMap<CacheKey, Record> = HashMap::new();
        let mut now = epoch();

        for _ in 0..300 {
            now += Duration::from_millis(rng.u64(0..1_500));

            match rng.u8(..10) {
                0..=5 => {
                    let record = random_record(&mut rng, now);
                    let key = CacheKey::for_record(&record);
                    let expected = match model.get(&key) {
                        None => UpdateKind::Added,
                        Some(old) if record.is_equal(old, true) => UpdateKind::NoChange,
                        Some(_) => UpdateKind::Changed,
                    };
                    assert_eq!(cache.update_record(record.clone()), expected);
                    model.insert(key, record);
                }
                6..=8 => {
                    let before: Vec<Record> = cache.iter().map(|(_, r)| r.clone()).collect();
                    let was_short_circuit = cache.next_expiration().is_some_and(|n| now < n);

                    let mut removed = Vec::new();
                    cache.cleanup_records(now, |r| removed.push(r.clone()));

                    // P6
                    if was_short_circuit {
                        assert!(removed.is_empty());
                        let after: Vec<Record> = cache.iter().map(|(_, r)| r.clone()).collect();
                        assert_eq!(before, after);
                    }

                    // P4: nada vencido sobra, e cada removido foi notificado uma vez
                    for (_, record) in cache.iter() {
                        assert!(!expired(&cache, record, now));
                    }
                    let expected_removed: Vec<&Record> = before
                        .iter()
                        .filter(|r| expired(&cache, r, now))
                        .collect();
                    assert_eq!(removed.iter().collect::<Vec<_>>(), expected_removed);
                    for record in &removed {
                        model.remove(&CacheKey::for_record(record));
                    }

                    // P5
                    let mut again = 0;
                    cache.cleanup_records(now, |_| again += 1);
                    assert_eq!(again, 0);
                }
                _ => {
                    let name = NAMES[rng.usize(..NAMES.len())];
                    let found = cache.find_records(rtype::PTR, name, now);
                    // P3
                    for record in &found {
                        assert!(!expired(&cache, record, now));
                        assert_eq!(record.name(), name);
                    }
                    let live = model
                        .iter()
                        .filter(|(k, r)| {
                            k.rtype() == rtype::PTR
                                && k.name() == name
                                && !expired(&cache, r, now)
                        })
                        .count();
                    assert_eq!(found.len(), live);
                }
            }

            // P1: o cache guarda exatamente o modelo, um registro por chave
            assert_eq!(cache.len(), model.len());
            for (key, record) in cache.iter() {
                assert_eq!(&CacheKey::for_record(record), key);
                assert_eq!(model.get(key), Some(record));
            }

            // P2
            assert_watermark_sound(&cache);
        }
    }
}

#[test]
fn find_results_follow_key_order() {
    let mut rng = fastrand::Rng::with_seed(7);
    let mut cache = MdnsCache::new();
    let now = epoch();

    for _ in 0..200 {
        let mut record = random_record(&mut rng, now);
        if record.ttl() == 0 {
            record = Record::new(record.name(), 10, now, record.rdata().clone());
        }
        cache.update_record(record);
    }

    for rtype in [rtype::A, rtype::PTR, rtype::SRV] {
        let found = cache.find_records(rtype, "", now);
        let keys: Vec<CacheKey> = found.iter().map(|r| CacheKey::for_record(r)).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert!(found.iter().all(|r| r.record_type() == rtype));
    }
}

#[test]
fn sweep_of_fully_expired_cache_empties_it() {
    let mut cache = MdnsCache::new();
    let now = epoch();
    for (i, name) in NAMES.iter().enumerate() {
        for target in TARGETS {
            cache.update_record(Record::new(
                *name,
                i as u32 + 1,
                now,
                RecordData::ptr(target),
            ));
        }
    }
    assert_eq!(cache.len(), NAMES.len() * TARGETS.len());

    let mut removed = 0;
    cache.cleanup_records(now + Duration::from_secs(60), |_| removed += 1);
    assert_eq!(removed, NAMES.len() * TARGETS.len());
    assert!(cache.is_empty());
    assert_eq!(cache.next_expiration(), None);
}
