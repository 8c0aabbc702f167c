//! Tickcache demo
//!
//! Walks through the cache lifecycle: callbacks for every event, a
//! permanent and an expiring entry, hits, misses, a delete and shutdown.

use std::time::Duration;

use serde::Serialize;
use tokio::time::sleep;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tickcache::{spawn_maintenance, Cache, CacheBuilder, Config};

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Person {
    name: String,
    age: u32,
}

impl Person {
    fn new(name: &str, age: u32) -> Self {
        Self {
            name: name.to_string(),
            age,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to debug for the library, can be overridden with RUST_LOG
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tickcache=debug,tickcache_demo=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!("Configuration loaded: tick_interval={}ms", config.tick_interval_ms);

    let cache: Cache<Person> = CacheBuilder::from_config(&config)
        .equals(|a: &Person, b: &Person| a.name == b.name && a.age == b.age)
        .on_before_tick(|| info!("before tick"))
        .on_after_tick(|| info!("after tick"))
        .on_create(|records| info!("created records: {:?}", records))
        .on_update(|records| info!("updated records: {:?}", records))
        .on_delete(|records| info!("deleted records: {:?}", records))
        .on_expiry(|key, item| info!("expired record {}: {:?}", key, item.value))
        .build();

    let handle = spawn_maintenance(cache.clone());
    let tick = config.tick_interval();

    // Let a couple of empty ticks pass
    sleep(tick * 2).await;

    let s1 = Person::new("S1", 1);
    let s2 = Person::new("S2", 2);
    cache.set(s1.name.clone(), s1.clone());
    cache.set_with_ttl(s2.name.clone(), s2, tick * 3);

    sleep(tick * 5).await;
    info!("metrics: {}", serde_json::to_string(&cache.metrics())?);

    let s3 = Person::new("S3", 3);
    cache.set(s3.name.clone(), s3);
    cache.get(&s1.name);
    cache.get("random");

    sleep(tick * 2).await;
    info!("metrics: {}", serde_json::to_string(&cache.metrics())?);

    cache.delete(&s1.name);
    info!("metrics: {}", serde_json::to_string(&cache.metrics())?);

    sleep(tick + Duration::from_millis(100)).await;
    cache.stop();
    handle.await??;

    info!("all values at shutdown: {}", serde_json::to_string(&cache.get_all())?);
    info!("finished");
    Ok(())
}
