//! Builders for the record store and HTTP handler state.

use std::sync::Arc;

use mockable::DefaultClock;
use tracing::warn;

use imaging_records::domain::ports::{
    AnalysisService, CaptureService, FixtureAnalysisService, FixtureCaptureService,
    RecordRepository,
};
use imaging_records::domain::{ImagingService, RecordStore};
use imaging_records::inbound::http::state::HttpState;
use imaging_records::outbound::memory::InMemoryRecordRepository;
use imaging_records::outbound::persistence::DieselRecordRepository;

use super::ServerConfig;

/// Build the record store, using PostgreSQL when a pool is configured and an
/// in-memory repository otherwise.
pub fn build_record_store(config: &ServerConfig) -> RecordStore {
    let repository: Arc<dyn RecordRepository> = match &config.db_pool {
        Some(pool) => Arc::new(DieselRecordRepository::new(pool.clone())),
        None => {
            warn!("no database configured; records are kept in memory");
            Arc::new(InMemoryRecordRepository::new())
        }
    };
    RecordStore::new(repository)
}

/// Build handler state around `store`, substituting fixture webhooks for any
/// adapter the configuration leaves out.
pub fn build_http_state(config: &ServerConfig, store: RecordStore) -> HttpState {
    let capture: Arc<dyn CaptureService> = config.capture.clone().unwrap_or_else(|| {
        warn!("no camera interface configured; using fixture captures");
        Arc::new(FixtureCaptureService)
    });
    let analysis: Arc<dyn AnalysisService> = config.analysis.clone().unwrap_or_else(|| {
        warn!("no analyzer configured; using fixture assessments");
        Arc::new(FixtureAnalysisService)
    });
    let imaging = ImagingService::new(store.clone(), capture, analysis, Arc::new(DefaultClock));
    HttpState::new(store, imaging, Arc::new(config.samples.clone()))
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use imaging_records::domain::records::{EntityKind, NewPatient, NewRecord};
    use imaging_records::sample_data::{SampleDataSettings, SampleGenerator};
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn config() -> ServerConfig {
        let samples = SampleGenerator::from_settings(&SampleDataSettings::default())
            .expect("default settings");
        ServerConfig::new(SocketAddr::from(([127, 0, 0, 1], 0)), samples)
    }

    #[rstest]
    #[tokio::test]
    async fn store_without_pool_keeps_records_in_memory(config: ServerConfig) {
        let store = build_record_store(&config);
        let draft = NewRecord::Patient(NewPatient {
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
        });

        let created = store.create(draft).await.expect("created");
        let rows = store
            .fetch_all(EntityKind::Patient.table_name())
            .await
            .expect("known table");

        assert_eq!(rows, vec![created]);
    }

    #[rstest]
    #[tokio::test]
    async fn http_state_shares_the_store(config: ServerConfig) {
        let store = build_record_store(&config);
        let state = build_http_state(&config, store.clone());
        let draft = NewRecord::Patient(NewPatient {
            first_name: "Byron".to_owned(),
            last_name: "Lovelace".to_owned(),
        });

        store.create(draft).await.expect("created");
        let rows = state
            .store
            .fetch_all(EntityKind::Patient.table_name())
            .await
            .expect("known table");

        assert_eq!(rows.len(), 1);
    }
}
