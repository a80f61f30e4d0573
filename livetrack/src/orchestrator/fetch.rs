//! Query planning and concurrent execution.

use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{debug, trace};

use super::types::{FetchRequest, ParkingPhase, SourceConfig};
use crate::object::{RowSource, SourcedRow};
use crate::store::{Column, Comparison, EventStore, Query, QueryParam, StoreError};

/// A query tagged with the source its rows belong to.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedQuery {
    pub source: RowSource,
    pub query: Query,
}

impl PlannedQuery {
    fn new(source: RowSource, query: Query) -> Self {
        Self { source, query }
    }
}

/// Issues the store queries of one tick.
///
/// Shared by all sessions; holds no per-session state.
pub struct QueryOrchestrator {
    store: Arc<dyn EventStore>,
    sources: SourceConfig,
}

impl QueryOrchestrator {
    pub fn new(store: Arc<dyn EventStore>, sources: SourceConfig) -> Self {
        Self { store, sources }
    }

    pub fn sources(&self) -> &SourceConfig {
        &self.sources
    }

    /// Build the queries for one tick.
    pub fn plan(&self, request: &FetchRequest<'_>) -> Vec<PlannedQuery> {
        let mut plan = vec![PlannedQuery::new(
            RowSource::Detection,
            self.window_query(&self.sources.tables.detections, request),
        )];

        if self.sources.track_vehicles {
            plan.push(PlannedQuery::new(
                RowSource::Aisle,
                self.window_query(&self.sources.tables.aisle, request),
            ));
        }

        if self.sources.track_parking {
            match request.parking {
                ParkingPhase::Prime => plan.extend(self.parking_prime_queries(request)),
                ParkingPhase::Delta => plan.push(self.parking_delta_query(request)),
            }
        }

        plan
    }

    /// Run every planned query concurrently and collect the rows.
    ///
    /// Fails with the first store error; partial results are discarded.
    pub async fn fetch(&self, request: &FetchRequest<'_>) -> Result<Vec<SourcedRow>, StoreError> {
        let plan = self.plan(request);
        debug!(
            store = self.store.name(),
            window = %request.window,
            queries = plan.len(),
            "Fetching tick rows"
        );

        let batches = try_join_all(plan.iter().map(|planned| async move {
            trace!(query = %planned.query, "Executing");
            let rows = self.store.execute(&planned.query).await?;
            Ok::<_, StoreError>((planned.source, rows))
        }))
        .await?;

        let rows: Vec<SourcedRow> = batches
            .into_iter()
            .flat_map(|(source, rows)| {
                rows.into_iter()
                    .map(move |row| SourcedRow::new(source, row))
            })
            .collect();

        debug!(rows = rows.len(), "Tick rows fetched");
        Ok(rows)
    }

    /// `<table> WHERE messageid = ? AND timestamp > ? AND timestamp <= ?`
    fn window_query(&self, table: &str, request: &FetchRequest<'_>) -> Query {
        Query::select(table)
            .eq(Column::MessageId, request.message_id())
            .filter(
                Column::Timestamp,
                Comparison::Gt,
                QueryParam::Timestamp(request.window.start),
            )
            .filter(
                Column::Timestamp,
                Comparison::Lte,
                QueryParam::Timestamp(request.window.end),
            )
    }

    fn parking_delta_query(&self, request: &FetchRequest<'_>) -> PlannedQuery {
        let query = Query::select(&self.sources.tables.parking_delta)
            .eq(Column::FacilityId, request.facility_id)
            .eq(Column::Level, request.level_id)
            .eq(Column::SensorType, &self.sources.sensor_type)
            .filter(
                Column::Timestamp,
                Comparison::Gt,
                QueryParam::Timestamp(request.window.start),
            )
            .filter(
                Column::Timestamp,
                Comparison::Lte,
                QueryParam::Timestamp(request.window.end),
            );
        PlannedQuery::new(RowSource::ParkingSpot, query)
    }

    fn parking_prime_queries(&self, request: &FetchRequest<'_>) -> Vec<PlannedQuery> {
        let sources = &self.sources;

        // A live client without delay can use the current-state table as is.
        if sources.is_live && sources.ui_delay_seconds == 0.0 {
            let query = Query::select(&sources.tables.parking_state)
                .eq(Column::FacilityId, request.facility_id)
                .eq(Column::Level, request.level_id);
            return vec![PlannedQuery::new(RowSource::ParkingSpot, query)];
        }

        // Otherwise reconstruct each spot's latest state as of the window end.
        sources
            .parking_spots
            .iter()
            .map(|spot| {
                let mut query = Query::select(&sources.tables.parking_playback)
                    .eq(Column::FacilityId, request.facility_id)
                    .eq(Column::Level, request.level_id)
                    .eq(Column::SensorType, &sources.sensor_type)
                    .eq(Column::SpotId, spot);
                if !sources.is_live {
                    query = query.filter(
                        Column::Timestamp,
                        Comparison::Gte,
                        QueryParam::Timestamp(request.session_start),
                    );
                }
                let query = query
                    .filter(
                        Column::Timestamp,
                        Comparison::Lte,
                        QueryParam::Timestamp(request.window.end),
                    )
                    .limit(1);
                PlannedQuery::new(RowSource::ParkingSpot, query)
            })
            .collect()
    }
}
