use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use rsbcrypt::{AsyncHasher, Cost, FixedSalt, Hasher, Salt, TokioSpawner};

const THREADS: usize = 16;

fn fast() -> Hasher {
    Hasher::new(Cost::new(4).unwrap())
}

#[test]
fn parallel_hashes_get_distinct_salts() {
    let hasher = Arc::new(fast());

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let hasher = Arc::clone(&hasher);
            thread::spawn(move || {
                let password = format!("password-{i}");
                let hash = hasher.hash(&password).unwrap();
                (password, hash)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let salts: HashSet<_> = results.iter().map(|(_, hash)| *hash.salt()).collect();
    assert_eq!(salts.len(), THREADS);

    for (password, hash) in &results {
        assert!(hasher.verify(password, &hash.to_string()).unwrap());
    }
}

#[test]
fn parallel_hashes_match_sequential_ones() {
    let salt = Salt::from([0x5a; 16]);
    let expected: Vec<String> = (0..THREADS)
        .map(|i| {
            fast()
                .hash_with_salt(format!("pw{i}"), salt)
                .unwrap()
                .to_string()
        })
        .collect();

    let hasher = fast().with_salt_source(FixedSalt(salt));
    let produced: Vec<String> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|i| {
                let hasher = &hasher;
                s.spawn(move || hasher.hash(format!("pw{i}")).unwrap().to_string())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(produced, expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_async_calls_do_not_interfere() {
    let spawner = TokioSpawner::try_current().unwrap();
    let hasher = AsyncHasher::with_spawner(fast(), spawner);

    let pending: Vec<_> = (0..THREADS)
        .map(|i| hasher.hash(format!("async-{i}")))
        .collect();

    let mut hashes = Vec::new();
    for p in pending {
        hashes.push(p.await.unwrap().to_string());
    }

    for (i, hash) in hashes.iter().enumerate() {
        assert!(hasher.verify(format!("async-{i}"), hash.clone()).await.unwrap());
        assert!(!hasher.verify(format!("async-{}", i + 1), hash.clone()).await.unwrap());
    }
}
