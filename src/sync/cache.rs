use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::entities::{car, driver, fuel_record, service_order};
use crate::error::AppResult;
use crate::store::{self, trips::TripView};
use crate::sync::Topic;

/// A session's in-memory copy of every collection.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LedgerSnapshot {
    pub cars: Vec<car::Model>,
    pub drivers: Vec<driver::Model>,
    pub trips: Vec<TripView>,
    pub active_trip: Option<TripView>,
    pub fuel_records: Vec<fuel_record::Model>,
    pub service_orders: Vec<service_order::Model>,
    pub refreshed_at: Option<DateTime<Utc>>,
}

/// Keeps a [`LedgerSnapshot`] in line with backend-confirmed state.
///
/// Collections are loaded first and swapped in afterwards, so readers never wait on I/O
/// and never see a half-applied refresh.
pub struct LedgerCache {
    db: DatabaseConnection,
    snapshot: RwLock<LedgerSnapshot>,
}

impl LedgerCache {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            snapshot: RwLock::new(LedgerSnapshot::default()),
        }
    }

    pub async fn snapshot(&self) -> LedgerSnapshot {
        self.snapshot.read().await.clone()
    }

    /// Re-fetches the collection behind `topic` and replaces it.
    pub async fn refresh(&self, topic: Topic) -> AppResult<()> {
        match topic {
            Topic::Cars => {
                let cars = store::cars::list(&self.db).await?;
                self.snapshot.write().await.cars = cars;
            }
            Topic::Drivers => {
                let drivers = store::drivers::list(&self.db).await?;
                self.snapshot.write().await.drivers = drivers;
            }
            Topic::Trips => {
                let trips = store::trips::list_completed(&self.db).await?;
                let active_trip = store::trips::find_active_view(&self.db).await?;
                let mut snapshot = self.snapshot.write().await;
                snapshot.trips = trips;
                snapshot.active_trip = active_trip;
            }
            Topic::FuelRecords => {
                let records = store::fuel_records::list(&self.db).await?;
                self.snapshot.write().await.fuel_records = records;
            }
            Topic::ServiceOrders => {
                let orders = store::service_orders::list(&self.db).await?;
                self.snapshot.write().await.service_orders = orders;
            }
        }

        self.snapshot.write().await.refreshed_at = Some(Utc::now());
        tracing::debug!(topic = %topic, "Ledger cache refreshed");
        Ok(())
    }

    pub async fn refresh_all(&self) -> AppResult<()> {
        for topic in Topic::ALL {
            self.refresh(topic).await?;
        }
        Ok(())
    }
}
