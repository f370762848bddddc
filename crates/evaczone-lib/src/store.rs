//! SQLite-backed persistence for zones and location reports.
//!
//! The store owns schema migration and all reads/writes. Zone payloads are
//! validated before any statement runs, so a partially-invalid zone is never
//! persisted. `list_zones` returns rows ordered by id; that ordering is the
//! stable input order the resolver's tie-breaks are defined over.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use crate::error::{Error, Result};
use crate::zone::{LocationReport, NewZone, Zone, ZoneCategory, ZoneId, ZoneUpdate};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS zones (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    category    TEXT NOT NULL,
    latitude    REAL NOT NULL,
    longitude   REAL NOT NULL,
    radius_km   REAL NOT NULL,
    address     TEXT,
    description TEXT,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS location_reports (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    phone_number   TEXT NOT NULL,
    latitude       REAL NOT NULL,
    longitude      REAL NOT NULL,
    address        TEXT,
    in_danger_zone INTEGER NOT NULL DEFAULT 0,
    zone_id        INTEGER REFERENCES zones(id),
    created_at     TEXT NOT NULL
);
";

const ZONE_COLUMNS: &str =
    "id, name, category, latitude, longitude, radius_km, address, description, \
     created_at, updated_at";

/// Payload for recording a position report.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLocationReport {
    pub phone_number: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    pub in_danger_zone: bool,
    pub zone_id: Option<ZoneId>,
}

/// Handle to the zones/reports database.
pub struct ZoneStore {
    conn: Connection,
}

impl ZoneStore {
    /// Open (creating if necessary) the database at `path` and apply the
    /// schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening zone database");
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open a transient in-memory database. Used by tests and the service
    /// test fixtures.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// All zones, ordered by id.
    pub fn list_zones(&self) -> Result<Vec<Zone>> {
        let sql = format!("SELECT {} FROM zones ORDER BY id", ZONE_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], zone_from_row)?;
        let zones = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(zones)
    }

    /// Zones of one category, ordered by id.
    pub fn list_zones_by_category(&self, category: ZoneCategory) -> Result<Vec<Zone>> {
        let sql = format!(
            "SELECT {} FROM zones WHERE category = ?1 ORDER BY id",
            ZONE_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![category.as_str()], zone_from_row)?;
        let zones = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(zones)
    }

    /// Fetch one zone by id.
    pub fn get_zone(&self, id: ZoneId) -> Result<Zone> {
        let sql = format!("SELECT {} FROM zones WHERE id = ?1", ZONE_COLUMNS);
        self.conn
            .query_row(&sql, params![id], zone_from_row)
            .optional()?
            .ok_or(Error::ZoneNotFound { id })
    }

    /// Number of zones currently stored.
    pub fn zone_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM zones", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Validate and insert a new zone, returning the stored row.
    pub fn create_zone(&self, new_zone: &NewZone) -> Result<Zone> {
        new_zone.validate()?;

        let now = Utc::now();
        self.conn.execute(
            "INSERT INTO zones \
             (name, category, latitude, longitude, radius_km, address, description, \
              created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                new_zone.name,
                new_zone.category.as_str(),
                new_zone.latitude,
                new_zone.longitude,
                new_zone.radius_km,
                new_zone.address,
                new_zone.description,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(id, name = %new_zone.name, category = %new_zone.category, "zone created");

        self.get_zone(id)
    }

    /// Validate and apply a partial update.
    ///
    /// Returns the updated zone and whether the center moved; a moved center
    /// obliges the caller to re-resolve the address through the geocoder.
    pub fn update_zone(&self, id: ZoneId, update: &ZoneUpdate) -> Result<(Zone, bool)> {
        update.validate()?;

        let current = self.get_zone(id)?;
        let moved = update.moves_center();

        let name = update.name.clone().unwrap_or(current.name);
        let category = update.category.unwrap_or(current.category);
        let latitude = update.latitude.unwrap_or(current.latitude);
        let longitude = update.longitude.unwrap_or(current.longitude);
        let radius_km = update.radius_km.unwrap_or(current.radius_km);
        let description = update.description.clone().or(current.description);

        self.conn.execute(
            "UPDATE zones SET name = ?1, category = ?2, latitude = ?3, longitude = ?4, \
             radius_km = ?5, description = ?6, updated_at = ?7 WHERE id = ?8",
            params![
                name,
                category.as_str(),
                latitude,
                longitude,
                radius_km,
                description,
                Utc::now().to_rfc3339(),
                id,
            ],
        )?;
        debug!(id, moved_center = moved, "zone updated");

        Ok((self.get_zone(id)?, moved))
    }

    /// Replace the resolved address of a zone.
    pub fn set_zone_address(&self, id: ZoneId, address: Option<&str>) -> Result<Zone> {
        let affected = self.conn.execute(
            "UPDATE zones SET address = ?1, updated_at = ?2 WHERE id = ?3",
            params![address, Utc::now().to_rfc3339(), id],
        )?;
        if affected == 0 {
            return Err(Error::ZoneNotFound { id });
        }
        self.get_zone(id)
    }

    /// Delete a zone by id.
    pub fn delete_zone(&self, id: ZoneId) -> Result<()> {
        let affected = self
            .conn
            .execute("DELETE FROM zones WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(Error::ZoneNotFound { id });
        }
        debug!(id, "zone deleted");
        Ok(())
    }

    /// Record a position report.
    pub fn insert_report(&self, report: &NewLocationReport) -> Result<LocationReport> {
        let now = Utc::now();
        self.conn.execute(
            "INSERT INTO location_reports \
             (phone_number, latitude, longitude, address, in_danger_zone, zone_id, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                report.phone_number,
                report.latitude,
                report.longitude,
                report.address,
                report.in_danger_zone,
                report.zone_id,
                now.to_rfc3339(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();

        Ok(LocationReport {
            id,
            phone_number: report.phone_number.clone(),
            latitude: report.latitude,
            longitude: report.longitude,
            address: report.address.clone(),
            in_danger_zone: report.in_danger_zone,
            zone_id: report.zone_id,
            created_at: now,
        })
    }

    /// Most recent position reports, newest first.
    pub fn recent_reports(&self, limit: usize) -> Result<Vec<LocationReport>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, phone_number, latitude, longitude, address, in_danger_zone, \
             zone_id, created_at \
             FROM location_reports ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], report_from_row)?;
        let reports = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(reports)
    }
}

impl std::fmt::Debug for ZoneStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZoneStore").finish_non_exhaustive()
    }
}

fn zone_from_row(row: &Row<'_>) -> rusqlite::Result<Zone> {
    Ok(Zone {
        id: row.get(0)?,
        name: row.get(1)?,
        category: parse_category(2, row.get(2)?)?,
        latitude: row.get(3)?,
        longitude: row.get(4)?,
        radius_km: row.get(5)?,
        address: row.get(6)?,
        description: row.get(7)?,
        created_at: parse_timestamp(8, row.get(8)?)?,
        updated_at: parse_timestamp(9, row.get(9)?)?,
    })
}

fn report_from_row(row: &Row<'_>) -> rusqlite::Result<LocationReport> {
    Ok(LocationReport {
        id: row.get(0)?,
        phone_number: row.get(1)?,
        latitude: row.get(2)?,
        longitude: row.get(3)?,
        address: row.get(4)?,
        in_danger_zone: row.get(5)?,
        zone_id: row.get(6)?,
        created_at: parse_timestamp(7, row.get(7)?)?,
    })
}

fn parse_category(index: usize, label: String) -> rusqlite::Result<ZoneCategory> {
    label
        .parse()
        .map_err(|err: Error| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(err)))
}

fn parse_timestamp(index: usize, value: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|stamp| stamp.with_timezone(&Utc))
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(err)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_zone(name: &str, category: ZoneCategory) -> NewZone {
        NewZone {
            name: name.to_string(),
            category,
            latitude: 37.7749,
            longitude: -122.4194,
            radius_km: 1.0,
            address: None,
            description: Some("test zone".to_string()),
        }
    }

    #[test]
    fn create_and_fetch_round_trip() {
        let store = ZoneStore::open_in_memory().unwrap();
        let created = store
            .create_zone(&sample_zone("Downtown", ZoneCategory::HazardHigh))
            .unwrap();

        let fetched = store.get_zone(created.id).unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.name, "Downtown");
        assert_eq!(fetched.category, ZoneCategory::HazardHigh);
    }

    #[test]
    fn list_zones_orders_by_id() {
        let store = ZoneStore::open_in_memory().unwrap();
        let a = store.create_zone(&sample_zone("A", ZoneCategory::Safe)).unwrap();
        let b = store
            .create_zone(&sample_zone("B", ZoneCategory::HazardHigh))
            .unwrap();
        let c = store
            .create_zone(&sample_zone("C", ZoneCategory::HazardMedium))
            .unwrap();

        let ids: Vec<ZoneId> = store.list_zones().unwrap().iter().map(|z| z.id).collect();
        assert_eq!(ids, vec![a.id, b.id, c.id]);
    }

    #[test]
    fn category_filter_matches_only_that_category() {
        let store = ZoneStore::open_in_memory().unwrap();
        store.create_zone(&sample_zone("A", ZoneCategory::Safe)).unwrap();
        store
            .create_zone(&sample_zone("B", ZoneCategory::HazardHigh))
            .unwrap();
        store.create_zone(&sample_zone("C", ZoneCategory::Safe)).unwrap();

        let safe = store.list_zones_by_category(ZoneCategory::Safe).unwrap();
        assert_eq!(safe.len(), 2);
        assert!(safe.iter().all(|z| z.category == ZoneCategory::Safe));
    }

    #[test]
    fn invalid_zone_is_rejected_and_not_stored() {
        let store = ZoneStore::open_in_memory().unwrap();
        let mut bad = sample_zone("Bad", ZoneCategory::Safe);
        bad.radius_km = 0.0;

        assert!(matches!(
            store.create_zone(&bad),
            Err(Error::InvalidZone { .. })
        ));
        assert_eq!(store.zone_count().unwrap(), 0);
    }

    #[test]
    fn get_unknown_zone_is_not_found() {
        let store = ZoneStore::open_in_memory().unwrap();
        assert!(matches!(
            store.get_zone(42),
            Err(Error::ZoneNotFound { id: 42 })
        ));
    }

    #[test]
    fn update_changes_fields_and_reports_center_movement() {
        let store = ZoneStore::open_in_memory().unwrap();
        let zone = store
            .create_zone(&sample_zone("Downtown", ZoneCategory::HazardHigh))
            .unwrap();

        let (updated, moved) = store
            .update_zone(
                zone.id,
                &ZoneUpdate {
                    radius_km: Some(2.5),
                    ..ZoneUpdate::default()
                },
            )
            .unwrap();
        assert!(!moved);
        assert_eq!(updated.radius_km, 2.5);
        assert_eq!(updated.latitude, zone.latitude);

        let (updated, moved) = store
            .update_zone(
                zone.id,
                &ZoneUpdate {
                    latitude: Some(37.8),
                    ..ZoneUpdate::default()
                },
            )
            .unwrap();
        assert!(moved);
        assert_eq!(updated.latitude, 37.8);
    }

    #[test]
    fn invalid_update_leaves_row_untouched() {
        let store = ZoneStore::open_in_memory().unwrap();
        let zone = store
            .create_zone(&sample_zone("Downtown", ZoneCategory::HazardHigh))
            .unwrap();

        let result = store.update_zone(
            zone.id,
            &ZoneUpdate {
                radius_km: Some(-1.0),
                ..ZoneUpdate::default()
            },
        );
        assert!(result.is_err());
        assert_eq!(store.get_zone(zone.id).unwrap().radius_km, zone.radius_km);
    }

    #[test]
    fn delete_removes_zone() {
        let store = ZoneStore::open_in_memory().unwrap();
        let zone = store.create_zone(&sample_zone("Gone", ZoneCategory::Safe)).unwrap();

        store.delete_zone(zone.id).unwrap();
        assert!(store.get_zone(zone.id).is_err());
        assert!(matches!(
            store.delete_zone(zone.id),
            Err(Error::ZoneNotFound { .. })
        ));
    }

    #[test]
    fn set_address_overwrites_previous_value() {
        let store = ZoneStore::open_in_memory().unwrap();
        let zone = store.create_zone(&sample_zone("Here", ZoneCategory::Safe)).unwrap();

        let updated = store
            .set_zone_address(zone.id, Some("1 Market St, San Francisco"))
            .unwrap();
        assert_eq!(updated.address.as_deref(), Some("1 Market St, San Francisco"));
    }

    #[test]
    fn reports_round_trip_newest_first() {
        let store = ZoneStore::open_in_memory().unwrap();
        let zone = store
            .create_zone(&sample_zone("Downtown", ZoneCategory::HazardHigh))
            .unwrap();

        store
            .insert_report(&NewLocationReport {
                phone_number: "+14155550100".to_string(),
                latitude: 37.7750,
                longitude: -122.4195,
                address: Some("Market St".to_string()),
                in_danger_zone: true,
                zone_id: Some(zone.id),
            })
            .unwrap();
        store
            .insert_report(&NewLocationReport {
                phone_number: "+14155550101".to_string(),
                latitude: 0.0,
                longitude: 0.0,
                address: None,
                in_danger_zone: false,
                zone_id: None,
            })
            .unwrap();

        let reports = store.recent_reports(10).unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].phone_number, "+14155550101");
        assert!(reports[1].in_danger_zone);
        assert_eq!(reports[1].zone_id, Some(zone.id));
    }
}
