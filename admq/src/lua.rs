// Server-side atomicity for every multi-key step. Each script pairs with a
// typed action struct; keys and args are documented next to the action's
// `prepare_invoke`.

// KEYS: seq, jobs, attempts, ready
// ARGV: payload
pub(crate) const SUBMIT: &str = r#"
local mid = redis.call('incr', KEYS[1])
redis.call('hset', KEYS[2], mid, ARGV[1])
redis.call('hset', KEYS[3], mid, 0)
redis.call('lpush', KEYS[4], mid)
return {'added', mid}
"#;

// KEYS: ready, jobs, attempts
pub(crate) const DEQUEUE: &str = r#"
local mid = redis.call('rpop', KEYS[1])
if not mid then
  return {'empty'}
end
local payload = redis.call('hget', KEYS[2], mid)
if not payload then
  return {'skip', mid}
end
local attempt = redis.call('hincrby', KEYS[3], mid, 1)
return {'handle', mid, payload, attempt}
"#;

// KEYS: jobs, attempts, done
// ARGV: mid
pub(crate) const FINISH: &str = r#"
redis.call('hdel', KEYS[1], ARGV[1])
redis.call('hdel', KEYS[2], ARGV[1])
return redis.call('sadd', KEYS[3], ARGV[1])
"#;

// KEYS: jobs, attempts, err-jobs, err
// ARGV: mid, payload, reason
pub(crate) const FAIL: &str = r#"
redis.call('hset', KEYS[3], ARGV[1], ARGV[2])
redis.call('hset', KEYS[4], ARGV[1], ARGV[3])
redis.call('hdel', KEYS[1], ARGV[1])
return redis.call('hdel', KEYS[2], ARGV[1])
"#;

// KEYS: schedule
// ARGV: mid, retry-at-ms
pub(crate) const RETRY_AT: &str = r#"
return redis.call('zadd', KEYS[1], ARGV[2], ARGV[1])
"#;

// KEYS: schedule, ready
// ARGV: now-ms
pub(crate) const PROMOTE: &str = r#"
local due = redis.call('zrangebyscore', KEYS[1], '-inf', ARGV[1])
if #due == 0 then
  return {'no-job'}
end
for _, mid in ipairs(due) do
  redis.call('lpush', KEYS[2], mid)
end
redis.call('zremrangebyscore', KEYS[1], '-inf', ARGV[1])
return {'promoted', #due}
"#;

// KEYS: gate seq, gate ready
pub(crate) const MARKER: &str = r#"
local mid = redis.call('incr', KEYS[1])
redis.call('lpush', KEYS[2], mid)
return {'added', mid}
"#;
