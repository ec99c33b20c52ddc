// salesdesk/server/src/db/counters.rs

use sqlx::PgConnection;

/// Counter row used for `#PED-` order codes.
pub const ORDER_COUNTER: &str = "order";

/// Creates the counter at 1 or bumps it, returning the value now stored.
pub const COUNTER_UPSERT_SQL: &str = "INSERT INTO code_counters (name, value) VALUES ($1, 1) \
   ON CONFLICT (name) DO UPDATE SET value = code_counters.value + 1 \
   RETURNING value";

/// Increments the named counter and returns the new value.
///
/// The upsert takes a row lock that is held until the surrounding transaction
/// ends, so concurrent callers are serialized and a rollback gives the number back.
pub async fn next_counter_value(conn: &mut PgConnection, name: &str) -> Result<i64, sqlx::Error> {
  sqlx::query_scalar::<_, i64>(COUNTER_UPSERT_SQL)
    .bind(name)
    .fetch_one(conn)
    .await
}
