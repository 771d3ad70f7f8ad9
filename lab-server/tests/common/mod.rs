//! Shared fixtures for registry integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use lab_server::Config;
use lab_server::db::DbService;
use lab_server::registry::{MemberRegistry, NewDocument, NewMember};
use lab_server::services::{
    CredentialError, CredentialHasher, LocalBlobStorage, NotificationEmitter, NotifyError,
    UploadedAsset,
};
use shared::models::{
    CandidateDetails, MemberId, NotificationEvent, ProfessorDetails, StaffDetails, TypeDetails,
};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const STRONG_PASSWORD: &str = "Str0ng!pass";

// 1x1 PNG
pub const PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// Emitter that keeps every event
#[derive(Default)]
pub struct RecordingEmitter {
    events: Mutex<Vec<NotificationEvent>>,
}

impl RecordingEmitter {
    pub fn events(&self) -> Vec<NotificationEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationEmitter for RecordingEmitter {
    async fn emit(&self, event: &NotificationEvent) -> Result<(), NotifyError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// Emitter that always fails
pub struct FailingEmitter;

#[async_trait]
impl NotificationEmitter for FailingEmitter {
    async fn emit(&self, _event: &NotificationEvent) -> Result<(), NotifyError> {
        Err(NotifyError::Rejected("webhook down".into()))
    }
}

/// Cheap reversible "hash" so tests stay fast
pub struct PlainHasher;

impl CredentialHasher for PlainHasher {
    fn hash(&self, secret: &str) -> Result<String, CredentialError> {
        Ok(format!("plain:{secret}"))
    }

    fn verify(&self, secret: &str, digest: &str) -> bool {
        digest == format!("plain:{secret}")
    }
}

pub struct TestRegistry {
    pub registry: MemberRegistry,
    pub emitter: Arc<RecordingEmitter>,
    pub config: Config,
    _dir: TempDir,
}

impl TestRegistry {
    pub fn upload_root(&self) -> std::path::PathBuf {
        std::path::PathBuf::from(&self.config.upload_dir)
    }

    pub async fn count(&self, sql: &str) -> i64 {
        sqlx::query_scalar(sql)
            .fetch_one(self.registry.pool())
            .await
            .unwrap()
    }

    /// Run raw SQL against the registry database
    pub async fn execute(&self, sql: &str) {
        sqlx::query(sql)
            .execute(self.registry.pool())
            .await
            .unwrap();
    }
}

pub async fn setup() -> TestRegistry {
    setup_with_emitter(None).await
}

pub async fn setup_with_emitter(emitter: Option<Arc<dyn NotificationEmitter>>) -> TestRegistry {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::with_work_dir(dir.path().to_string_lossy().into_owned());
    let db = DbService::new(&config).await.unwrap();

    let recording = Arc::new(RecordingEmitter::default());
    let emitter = emitter.unwrap_or_else(|| recording.clone() as Arc<dyn NotificationEmitter>);
    let storage = Arc::new(LocalBlobStorage::new(
        &config.upload_dir,
        config.max_upload_bytes,
    ));
    let registry = MemberRegistry::new(db.pool, storage, Arc::new(PlainHasher), emitter);

    TestRegistry {
        registry,
        emitter: recording,
        config,
        _dir: dir,
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn base(email: &str, details: TypeDetails) -> NewMember {
    NewMember {
        first_name: "Test".into(),
        last_name: "Member".into(),
        primary_email: email.into(),
        other_emails: vec![],
        phone: None,
        id_number: None,
        passport_number: None,
        password: STRONG_PASSWORD.into(),
        date_of_birth: date(1990, 1, 15),
        biography: None,
        status: None,
        start_date: date(2022, 9, 1),
        end_date: None,
        details,
        photo: None,
        education: vec![],
        career: vec![],
        social_links: vec![],
        awards: vec![],
        documents: vec![],
    }
}

pub fn phd(email: &str, phone: &str, id_number: &str, passport: &str) -> NewMember {
    let mut member = base(
        email,
        TypeDetails::PhdCandidate(CandidateDetails {
            thesis_title: Some("Typed effects".into()),
            ..Default::default()
        }),
    );
    member.phone = Some(phone.into());
    member.id_number = Some(id_number.into());
    member.passport_number = Some(passport.into());
    member
}

pub fn professor(email: &str) -> NewMember {
    base(
        email,
        TypeDetails::Professor(ProfessorDetails {
            designation: "Associate Professor".into(),
            research_interests: Some("Distributed systems".into()),
            office_room: Some("B-204".into()),
        }),
    )
}

pub fn staff(email: &str) -> NewMember {
    base(
        email,
        TypeDetails::StaffMember(StaffDetails {
            designation: "Lab technician".into(),
        }),
    )
}

pub fn document(title: &str) -> NewDocument {
    NewDocument {
        title: title.into(),
        document_type: "proposal".into(),
        file: UploadedAsset::new(format!("{title}.pdf"), b"%PDF-1.7".to_vec()),
    }
}

pub fn id(raw: &str) -> MemberId {
    raw.parse().unwrap()
}
