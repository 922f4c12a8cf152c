//! Static reference lists (trip types, locations, landings, fish types, boats)

use catchlog_common::models::ReferenceItem;
use sqlx::{Row, SqlitePool};

/// One of the read-only lookup tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceList {
    TripTypes,
    Locations,
    Landings,
    FishTypes,
    Boats,
}

impl ReferenceList {
    pub const ALL: [ReferenceList; 5] = [
        ReferenceList::TripTypes,
        ReferenceList::Locations,
        ReferenceList::Landings,
        ReferenceList::FishTypes,
        ReferenceList::Boats,
    ];

    pub fn table(self) -> &'static str {
        match self {
            ReferenceList::TripTypes => "trip_types",
            ReferenceList::Locations => "locations",
            ReferenceList::Landings => "landings",
            ReferenceList::FishTypes => "fish_types",
            ReferenceList::Boats => "boats",
        }
    }

    pub fn id_column(self) -> &'static str {
        match self {
            ReferenceList::TripTypes => "trip_id",
            ReferenceList::Locations => "location_id",
            ReferenceList::Landings => "landing_id",
            ReferenceList::FishTypes => "fish_id",
            ReferenceList::Boats => "boat_id",
        }
    }

    pub fn name_column(self) -> &'static str {
        match self {
            ReferenceList::TripTypes => "trip_type",
            ReferenceList::Locations => "location_name",
            ReferenceList::Landings => "landing_name",
            ReferenceList::FishTypes => "fish_type",
            ReferenceList::Boats => "boat_name",
        }
    }
}

/// All entries of a list as `{id, name}`, ordered by id
pub async fn list_reference(pool: &SqlitePool, list: ReferenceList) -> sqlx::Result<Vec<ReferenceItem>> {
    let query = format!(
        "SELECT {id} AS id, {name} AS name FROM {table} ORDER BY {id}",
        id = list.id_column(),
        name = list.name_column(),
        table = list.table()
    );

    let rows = sqlx::query(&query).fetch_all(pool).await?;

    rows.iter()
        .map(|row| {
            Ok::<_, sqlx::Error>(ReferenceItem {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
            })
        })
        .collect()
}

/// Add an entry to a list; used to seed lookups
pub async fn insert_reference(pool: &SqlitePool, list: ReferenceList, name: &str) -> sqlx::Result<i64> {
    let query = format!(
        "INSERT INTO {} ({}) VALUES (?)",
        list.table(),
        list.name_column()
    );
    let result = sqlx::query(&query).bind(name).execute(pool).await?;
    Ok(result.last_insert_rowid())
}
