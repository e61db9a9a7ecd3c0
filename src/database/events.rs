//! Durable event log (`event_logs` table)

use rusqlite::params;
use rusqlite::types::Type;

use super::connection::SqliteAccountStore;
use super::models::{EventLevel, EventRecord};
use super::StoreResult;

impl SqliteAccountStore {
    pub(super) fn insert_event(
        &self,
        level: EventLevel,
        message: &str,
        meta: Option<&serde_json::Value>,
    ) -> StoreResult<()> {
        let meta_text = meta.map(serde_json::to_string).transpose()?;
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO event_logs (level, message, meta, timestamp) VALUES (?1, ?2, ?3, ?4)",
            params![
                level.as_str(),
                message,
                meta_text,
                chrono::Utc::now().timestamp_millis()
            ],
        )?;
        Ok(())
    }

    pub(super) fn load_recent_events(&self, limit: usize) -> StoreResult<Vec<EventRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, level, message, meta, timestamp FROM event_logs
             ORDER BY timestamp DESC, id DESC LIMIT ?1",
        )?;

        let rows = stmt.query_map(params![limit as i64], |row| {
            let level_text: String = row.get(1)?;
            let level = level_text
                .parse::<EventLevel>()
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, e.into()))?;

            // Unparseable metadata is dropped rather than failing the read
            let meta_text: Option<String> = row.get(3)?;
            let meta = meta_text.and_then(|text| serde_json::from_str(&text).ok());

            Ok(EventRecord {
                id: row.get(0)?,
                level,
                message: row.get(2)?,
                meta,
                timestamp_ms: row.get(4)?,
            })
        })?;

        let mut events = Vec::new();
        for event in rows {
            events.push(event?);
        }
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use crate::database::{AccountStore, EventLevel, SqliteAccountStore};
    use serde_json::json;

    #[test]
    fn events_come_back_newest_first_with_meta() {
        let store = SqliteAccountStore::open_in_memory().unwrap();
        store
            .append_event(EventLevel::Info, "Reclaim cycle started", None)
            .unwrap();
        store
            .append_event(
                EventLevel::Success,
                "Reclaimed account",
                Some(&json!({ "address": "A", "lamports": 2039280 })),
            )
            .unwrap();

        let events = store.recent_events(10).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].message, "Reclaimed account");
        assert_eq!(events[0].level, EventLevel::Success);
        assert_eq!(events[0].meta.as_ref().unwrap()["lamports"], 2039280);
        assert!(events[1].meta.is_none());

        assert_eq!(store.recent_events(1).unwrap().len(), 1);
    }
}
