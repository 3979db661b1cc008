//! Test helpers for inbound HTTP components.
//!
//! Handlers run against the in-memory repository preloaded with a small
//! ward: patients 1 and 2, image set 10 of patient 1, image set 11 of
//! patient 2, images 20 and 21 in set 10 and assessment 30 of image 20.

use std::path::PathBuf;
use std::sync::Arc;

use actix_web::body::BoxBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{App, test, web};
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use sample_data::{GenerationOptions, TimestampFormat};
use uuid::Uuid;

use crate::domain::ports::{
    AnalysisService, CaptureService, FixtureAnalysisService, FixtureCaptureService,
    RecordRepository,
};
use crate::domain::records::{Assessment, Image, ImageSet, Patient, Record, RecordId};
use crate::domain::{ImagingService, RecordStore};
use crate::inbound::http::configure;
use crate::inbound::http::health::HealthState;
use crate::inbound::http::state::HttpState;
use crate::outbound::memory::InMemoryRecordRepository;
use crate::sample_data::SampleGenerator;

/// Clock frozen at one instant.
pub(crate) struct FixedClock(pub(crate) DateTime<Utc>);

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

pub(crate) fn id(n: u128) -> RecordId {
    RecordId::from_uuid(Uuid::from_u128(n))
}

pub(crate) fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0)
        .single()
        .expect("valid instant")
}

pub(crate) fn ward() -> Vec<Record> {
    let patient = |n, first: &str| {
        Record::Patient(Patient {
            id: id(n),
            first_name: first.to_owned(),
            last_name: "Lovelace".to_owned(),
        })
    };
    vec![
        patient(1, "Ada"),
        patient(2, "Byron"),
        Record::ImageSet(ImageSet {
            id: id(10),
            patient_id: id(1),
        }),
        Record::ImageSet(ImageSet {
            id: id(11),
            patient_id: id(2),
        }),
        Record::Image(Image {
            id: id(20),
            set_id: id(10),
            patient_id: id(1),
            image_timestamp: at(8),
            uri: "captures/20.png".to_owned(),
        }),
        Record::Image(Image {
            id: id(21),
            set_id: id(10),
            patient_id: id(1),
            image_timestamp: at(9),
            uri: "captures/21.png".to_owned(),
        }),
        Record::Assessment(Assessment {
            id: id(30),
            image_id: id(20),
            set_id: id(10),
            patient_id: id(1),
            assessment_timestamp: at(10),
            assessment: true,
        }),
    ]
}

pub(crate) fn sample_generator() -> SampleGenerator {
    SampleGenerator::new(
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/sample-data/seeds.json"),
        "ward-rounds".to_owned(),
        GenerationOptions::new(TimestampFormat::default(), 50),
        None,
    )
}

/// Builds handler state over `repository` and the given webhooks.
pub(crate) fn state_with(
    repository: Arc<dyn RecordRepository>,
    capture: Arc<dyn CaptureService>,
    analysis: Arc<dyn AnalysisService>,
) -> HttpState {
    let store = RecordStore::new(repository);
    let imaging = ImagingService::new(
        store.clone(),
        capture,
        analysis,
        Arc::new(FixedClock(at(12))),
    );
    HttpState::new(store, imaging, Arc::new(sample_generator()))
}

/// Handler state over the ward fixture with fixture webhooks.
pub(crate) fn ward_state() -> (HttpState, InMemoryRecordRepository) {
    let repository = InMemoryRecordRepository::with_records(ward());
    let state = state_with(
        Arc::new(repository.clone()),
        Arc::new(FixtureCaptureService),
        Arc::new(FixtureAnalysisService),
    );
    (state, repository)
}

/// Initialises the full route table over `state`.
pub(crate) async fn init_app(
    state: HttpState,
) -> impl Service<actix_http::Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>
{
    let health = HealthState::new();
    health.mark_ready();
    test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .app_data(web::Data::new(health))
            .configure(configure),
    )
    .await
}
