/// Cache-or-compute helper for Redis-backed lookups.
///
/// Checks the cache for `$key`; on a hit the cached value is returned, on a
/// miss `$block` computes it, the result is queued for a background cache
/// write with `$ttl` seconds to live, and the computed value is returned.
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        if let Some(cached) = $cache.get_from_cache(&$key).await? {
            Ok(cached)
        } else {
            let value = $block.await?;
            $cache.set_in_background(&$key, &value, $ttl);
            Ok(value)
        }
    }};
}
