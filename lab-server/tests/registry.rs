mod common;

use common::*;
use lab_server::registry::{MemberPatch, NewAward, RegistryError, RosterFilter};
use lab_server::services::UploadedAsset;
use shared::models::{
    CandidateDetails, ConflictDimension, DirectorDetails, EducationEntry, MemberIdentity,
    MemberStatus, MemberType, NotificationStatus, SocialLink, TypeDetails,
};
use std::sync::Arc;

fn conflict_dimensions(err: &RegistryError) -> Vec<ConflictDimension> {
    err.conflict_report()
        .map(|r| r.dimensions().into_iter().collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_create_phd_candidate_issues_first_id() {
    let t = setup().await;

    let created = t
        .registry
        .create_member(phd("a@x.com", "+1000", "ID1", "PP1"))
        .await
        .unwrap();
    assert_eq!(created.to_string(), "PHDC01MVSD");

    let record = t.registry.get_member(created).await.unwrap();
    assert!(record.is_consistent());
    assert_eq!(record.roster.member_type, MemberType::PhdCandidate);
    assert_eq!(record.roster.status, MemberStatus::Active);
    assert_eq!(record.roster.password_hash, format!("plain:{STRONG_PASSWORD}"));

    let notifications = t
        .registry
        .list_notifications(Some(created), false)
        .await
        .unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].status, NotificationStatus::Unread);

    let events = t.emitter.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].member_id, created);
}

#[tokio::test]
async fn test_phone_conflict_rejects_without_consuming_id() {
    let t = setup().await;
    t.registry
        .create_member(phd("a@x.com", "+1000", "ID1", "PP1"))
        .await
        .unwrap();

    let err = t
        .registry
        .create_member(phd("b@x.com", "+1000", "ID2", "PP2"))
        .await
        .unwrap_err();
    assert_eq!(conflict_dimensions(&err), vec![ConflictDimension::Phone]);

    assert_eq!(t.count("SELECT COUNT(*) FROM members").await, 1);
    assert_eq!(t.count("SELECT COUNT(*) FROM phd_candidates").await, 1);
    assert_eq!(t.count("SELECT COUNT(*) FROM notifications").await, 1);
    assert_eq!(
        t.registry
            .peek_next_id(MemberType::PhdCandidate)
            .await
            .unwrap()
            .to_string(),
        "PHDC02MVSD"
    );

    let next = t
        .registry
        .create_member(phd("b@x.com", "+2000", "ID2", "PP2"))
        .await
        .unwrap();
    assert_eq!(next.to_string(), "PHDC02MVSD");
}

#[tokio::test]
async fn test_inactive_without_end_date_is_rejected() {
    let t = setup().await;
    let member = t
        .registry
        .create_member(phd("a@x.com", "+1000", "ID1", "PP1"))
        .await
        .unwrap();

    let patch = MemberPatch {
        status: Some(MemberStatus::Inactive),
        ..Default::default()
    };
    let err = t.registry.update_member(member, patch).await.unwrap_err();
    assert!(err.is_validation());

    let record = t.registry.get_member(member).await.unwrap();
    assert_eq!(record.profile.profile.fields.status, MemberStatus::Active);
    assert_eq!(t.emitter.events().len(), 1);
}

#[tokio::test]
async fn test_secondary_email_matching_another_primary_conflicts() {
    let t = setup().await;
    let member = t
        .registry
        .create_member(phd("a@x.com", "+1000", "ID1", "PP1"))
        .await
        .unwrap();
    t.registry
        .create_member(professor("b@x.com"))
        .await
        .unwrap();

    let patch = MemberPatch {
        other_emails: Some(vec!["B@x.com".into()]),
        ..Default::default()
    };
    let err = t.registry.update_member(member, patch).await.unwrap_err();
    assert_eq!(
        conflict_dimensions(&err),
        vec![ConflictDimension::SecondaryEmail]
    );

    let record = t.registry.get_member(member).await.unwrap();
    assert!(record.roster.other_emails.is_empty());
}

#[tokio::test]
async fn test_report_lists_every_dimension() {
    let t = setup().await;
    t.registry
        .create_member(phd("a@x.com", "+1000", "ID1", "PP1"))
        .await
        .unwrap();

    let err = t
        .registry
        .create_member(phd("A@X.com", "+1000", "ID1", "PP1"))
        .await
        .unwrap_err();
    assert_eq!(
        conflict_dimensions(&err),
        vec![
            ConflictDimension::PrimaryEmail,
            ConflictDimension::Phone,
            ConflictDimension::IdNumber,
            ConflictDimension::Passport,
        ]
    );
}

#[tokio::test]
async fn test_primary_matching_existing_secondary_conflicts_across_types() {
    let t = setup().await;
    let mut prof = professor("prof@lab.org");
    prof.other_emails = vec!["shared@lab.org".into()];
    let prof_id = t.registry.create_member(prof).await.unwrap();

    let err = t
        .registry
        .create_member(staff("shared@lab.org"))
        .await
        .unwrap_err();
    let report = err.conflict_report().unwrap();
    assert!(report.has(ConflictDimension::SecondaryEmail));
    assert!(report.member_ids().contains(&prof_id));
}

#[tokio::test]
async fn test_guard_is_idempotent() {
    let t = setup().await;
    t.registry
        .create_member(phd("a@x.com", "+1000", "ID1", "PP1"))
        .await
        .unwrap();

    let candidate = MemberIdentity {
        primary_email: Some("a@x.com".into()),
        phone: Some("+1000".into()),
        ..Default::default()
    };
    let first = t.registry.check_conflicts(&candidate, None).await.unwrap();
    let second = t.registry.check_conflicts(&candidate, None).await.unwrap();
    assert_eq!(first, second);
    assert!(!first.is_clear());

    let clear = t
        .registry
        .check_conflicts(&MemberIdentity::default(), None)
        .await
        .unwrap();
    assert!(clear.is_clear());
}

#[tokio::test]
async fn test_guard_excludes_own_row() {
    let t = setup().await;
    let member = t
        .registry
        .create_member(phd("a@x.com", "+1000", "ID1", "PP1"))
        .await
        .unwrap();

    let patch = MemberPatch {
        phone: Some("+1000".into()),
        first_name: Some("Ada".into()),
        ..Default::default()
    };
    t.registry.update_member(member, patch).await.unwrap();

    let record = t.registry.get_member(member).await.unwrap();
    assert_eq!(record.roster.first_name, "Ada");
    assert!(record.is_consistent());
}

#[tokio::test]
async fn test_rejected_create_leaves_no_rows() {
    let t = setup().await;
    let mut minor = phd("kid@x.com", "+3000", "ID3", "PP3");
    minor.date_of_birth = shared::util::today();
    minor.education = vec![EducationEntry {
        degree: "BSc".into(),
        institution: "Uni".into(),
        passing_year: 2020,
    }];

    let err = t.registry.create_member(minor).await.unwrap_err();
    assert!(err.is_validation());

    assert_eq!(t.count("SELECT COUNT(*) FROM members").await, 0);
    assert_eq!(t.count("SELECT COUNT(*) FROM phd_candidates").await, 0);
    assert_eq!(
        t.count("SELECT COUNT(*) FROM phd_candidates_education").await,
        0
    );
    assert_eq!(
        t.registry
            .peek_next_id(MemberType::PhdCandidate)
            .await
            .unwrap()
            .to_string(),
        "PHDC01MVSD"
    );
}

#[tokio::test]
async fn test_failure_after_rows_inserted_rolls_back() {
    let t = setup().await;
    t.execute("DROP TABLE phd_candidates_social_links").await;

    let mut input = phd("a@x.com", "+1000", "ID1", "PP1");
    input.education = vec![EducationEntry {
        degree: "MSc".into(),
        institution: "Uni".into(),
        passing_year: 2021,
    }];
    input.social_links = vec![SocialLink {
        platform: "github".into(),
        url: "https://github.com/ada".into(),
    }];

    let err = t.registry.create_member(input).await.unwrap_err();
    assert!(matches!(err, RegistryError::WriteFailed(_)), "{err:?}");

    assert_eq!(t.count("SELECT COUNT(*) FROM members").await, 0);
    assert_eq!(t.count("SELECT COUNT(*) FROM phd_candidates").await, 0);
    assert_eq!(
        t.count("SELECT COUNT(*) FROM phd_candidates_education").await,
        0
    );
    assert_eq!(t.count("SELECT COUNT(*) FROM notifications").await, 0);
    assert_eq!(
        t.registry
            .peek_next_id(MemberType::PhdCandidate)
            .await
            .unwrap()
            .to_string(),
        "PHDC01MVSD"
    );
    assert!(t.emitter.events().is_empty());
}

#[tokio::test]
async fn test_unreadable_identity_table_refuses_write() {
    let t = setup().await;
    t.execute("DROP TABLE staff_members").await;

    let err = t
        .registry
        .create_member(phd("a@x.com", "+1000", "ID1", "PP1"))
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::GuardUnavailable(_)), "{err:?}");

    assert_eq!(t.count("SELECT COUNT(*) FROM members").await, 0);
    assert_eq!(t.count("SELECT COUNT(*) FROM phd_candidates").await, 0);
    assert_eq!(t.count("SELECT COUNT(*) FROM notifications").await, 0);
    assert_eq!(
        t.registry
            .peek_next_id(MemberType::PhdCandidate)
            .await
            .unwrap()
            .to_string(),
        "PHDC01MVSD"
    );
}

#[tokio::test]
async fn test_weak_password_rejected_before_writes() {
    let t = setup().await;
    let member = t
        .registry
        .create_member(staff("s@lab.org"))
        .await
        .unwrap();

    let patch = MemberPatch {
        password: Some("password".into()),
        ..Default::default()
    };
    let err = t.registry.update_member(member, patch).await.unwrap_err();
    assert!(matches!(err, RegistryError::WeakPassword));
    assert_eq!(t.count("SELECT COUNT(*) FROM notifications").await, 1);

    let mut weak = staff("w@lab.org");
    weak.password = "Short1!".into();
    assert!(matches!(
        t.registry.create_member(weak).await,
        Err(RegistryError::WeakPassword)
    ));
    assert_eq!(t.count("SELECT COUNT(*) FROM members").await, 1);
}

#[tokio::test]
async fn test_collections_are_replaced_wholesale() {
    let t = setup().await;
    let mut input = professor("p@lab.org");
    input.education = vec![
        EducationEntry {
            degree: "BSc".into(),
            institution: "Old Uni".into(),
            passing_year: 2001,
        },
        EducationEntry {
            degree: "MSc".into(),
            institution: "Old Uni".into(),
            passing_year: 2003,
        },
    ];
    input.social_links = vec![SocialLink {
        platform: "github".into(),
        url: "https://github.com/prof".into(),
    }];
    let member = t.registry.create_member(input).await.unwrap();

    let phd_entry = EducationEntry {
        degree: "PhD".into(),
        institution: "New Uni".into(),
        passing_year: 2008,
    };
    let patch = MemberPatch {
        education: Some(vec![phd_entry.clone()]),
        social_links: Some(vec![]),
        ..Default::default()
    };
    t.registry.update_member(member, patch).await.unwrap();

    let record = t.registry.get_member(member).await.unwrap();
    assert_eq!(record.profile.education, vec![phd_entry]);
    assert!(record.profile.social_links.is_empty());
}

#[tokio::test]
async fn test_documents_and_awards_are_appended() {
    let t = setup().await;
    let mut input = professor("p@lab.org");
    input.documents = vec![document("cv")];
    let member = t.registry.create_member(input).await.unwrap();
    let before = t.registry.get_member(member).await.unwrap().profile.documents;
    assert_eq!(before.len(), 1);

    let patch = MemberPatch {
        new_documents: vec![document("syllabus"), document("grant")],
        new_awards: vec![NewAward {
            title: "Teaching award".into(),
            year: 2024,
            details: None,
            photo: Some(UploadedAsset::new("award.png", PNG.to_vec())),
        }],
        ..Default::default()
    };
    t.registry.update_member(member, patch).await.unwrap();

    let after = t.registry.get_member(member).await.unwrap().profile;
    assert_eq!(after.documents.len(), 3);
    assert_eq!(after.documents[0], before[0]);
    assert_eq!(after.awards.len(), 1);
    let award_photo = after.awards[0].photo_path.clone().unwrap();
    assert!(t.upload_root().join(award_photo).exists());
}

#[tokio::test]
async fn test_documents_rejected_for_types_without_them() {
    let t = setup().await;
    let mut input = staff("s@lab.org");
    input.documents = vec![document("cv")];
    let err = t.registry.create_member(input).await.unwrap_err();
    assert!(err.is_validation());
    assert_eq!(t.count("SELECT COUNT(*) FROM members").await, 0);
}

#[tokio::test]
async fn test_delete_document_removes_stored_file() {
    let t = setup().await;
    let mut input = phd("a@x.com", "+1000", "ID1", "PP1");
    input.documents = vec![document("proposal")];
    let member = t.registry.create_member(input).await.unwrap();

    let doc = t.registry.get_member(member).await.unwrap().profile.documents[0].clone();
    let stored = t.upload_root().join(&doc.file_path);
    assert!(stored.exists());

    t.registry.delete_document(member, doc.id).await.unwrap();
    assert!(!stored.exists());
    assert!(
        t.registry
            .get_member(member)
            .await
            .unwrap()
            .profile
            .documents
            .is_empty()
    );

    assert!(matches!(
        t.registry.delete_document(member, doc.id).await,
        Err(RegistryError::DocumentNotFound { .. })
    ));
}

#[tokio::test]
async fn test_remove_unknown_document_rolls_back_update() {
    let t = setup().await;
    let member = t
        .registry
        .create_member(phd("a@x.com", "+1000", "ID1", "PP1"))
        .await
        .unwrap();

    let patch = MemberPatch {
        first_name: Some("Changed".into()),
        remove_documents: vec![42],
        ..Default::default()
    };
    assert!(matches!(
        t.registry.update_member(member, patch).await,
        Err(RegistryError::DocumentNotFound { document_id: 42, .. })
    ));
    let record = t.registry.get_member(member).await.unwrap();
    assert_eq!(record.roster.first_name, "Test");
}

#[tokio::test]
async fn test_photo_replacement_removes_old_file() {
    let t = setup().await;
    let mut input = staff("s@lab.org");
    input.photo = Some(UploadedAsset::new("me.png", PNG.to_vec()));
    let member = t.registry.create_member(input).await.unwrap();

    let old = t.registry.get_member(member).await.unwrap().roster.photo_path.unwrap();
    assert!(t.upload_root().join(&old).exists());

    let patch = MemberPatch {
        photo: Some(UploadedAsset::new("new.png", PNG.to_vec())),
        ..Default::default()
    };
    t.registry.update_member(member, patch).await.unwrap();

    let record = t.registry.get_member(member).await.unwrap();
    let new = record.roster.photo_path.clone().unwrap();
    assert_ne!(new, old);
    assert!(new.starts_with(&format!("staff_member/{member}/")));
    assert_eq!(record.profile.profile.fields.photo_path, Some(new.clone()));
    assert!(t.upload_root().join(&new).exists());
    assert!(!t.upload_root().join(&old).exists());
}

fn stored_files(root: &std::path::Path) -> usize {
    let Ok(entries) = std::fs::read_dir(root) else {
        return 0;
    };
    entries
        .flatten()
        .map(|e| {
            let path = e.path();
            if path.is_dir() { stored_files(&path) } else { 1 }
        })
        .sum()
}

#[tokio::test]
async fn test_rejected_create_discards_uploaded_files() {
    let t = setup().await;
    let mut input = phd("a@x.com", "+1000", "ID1", "PP1");
    input.details = TypeDetails::PhdCandidate(CandidateDetails {
        supervisor_id: Some(id("P09MVSD")),
        ..Default::default()
    });
    input.photo = Some(UploadedAsset::new("me.png", PNG.to_vec()));
    input.documents = vec![document("proposal")];

    // The supervisor check runs inside the transaction, after uploads are stored
    let err = t.registry.create_member(input).await.unwrap_err();
    assert!(err.is_validation());
    assert_eq!(stored_files(&t.upload_root()), 0);
    let owners = std::fs::read_dir(t.upload_root().join("phd_candidate"))
        .map(|entries| entries.count())
        .unwrap_or(0);
    assert_eq!(owners, 0);
}

#[tokio::test]
async fn test_create_uploads_land_under_member_id() {
    let t = setup().await;
    let mut input = professor("p@lab.org");
    input.photo = Some(UploadedAsset::new("me.png", PNG.to_vec()));
    input.documents = vec![document("cv")];
    input.awards = vec![NewAward {
        title: "Best paper".into(),
        year: 2023,
        details: None,
        photo: Some(UploadedAsset::new("award.png", PNG.to_vec())),
    }];

    let member = t.registry.create_member(input).await.unwrap();
    assert_eq!(member.to_string(), "P01MVSD");

    let record = t.registry.get_member(member).await.unwrap();
    let profile = &record.profile;
    let paths = [
        record.roster.photo_path.clone().unwrap(),
        profile.documents[0].file_path.clone(),
        profile.awards[0].photo_path.clone().unwrap(),
    ];
    for path in &paths {
        assert!(path.starts_with("professor/P01MVSD/"), "{path}");
        assert!(t.upload_root().join(path).exists());
    }

    let owners: Vec<String> = std::fs::read_dir(t.upload_root().join("professor"))
        .unwrap()
        .flatten()
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(owners, vec!["P01MVSD".to_string()]);
    assert_eq!(stored_files(&t.upload_root()), 3);
}

#[tokio::test]
async fn test_status_transitions() {
    let t = setup().await;
    let member = t
        .registry
        .create_member(phd("a@x.com", "+1000", "ID1", "PP1"))
        .await
        .unwrap();

    let graduate = MemberPatch {
        status: Some(MemberStatus::Graduated),
        end_date: Some(date(2025, 6, 30)),
        ..Default::default()
    };
    t.registry.update_member(member, graduate).await.unwrap();
    let record = t.registry.get_member(member).await.unwrap();
    assert_eq!(record.roster.status, MemberStatus::Graduated);
    assert_eq!(record.roster.end_date, Some(date(2025, 6, 30)));

    let emeritus = MemberPatch {
        status: Some(MemberStatus::Emeritus),
        end_date: Some(date(2025, 6, 30)),
        ..Default::default()
    };
    assert!(
        t.registry
            .update_member(member, emeritus)
            .await
            .unwrap_err()
            .is_validation()
    );

    let back = MemberPatch {
        status: Some(MemberStatus::Active),
        ..Default::default()
    };
    t.registry.update_member(member, back).await.unwrap();
    let record = t.registry.get_member(member).await.unwrap();
    assert_eq!(record.roster.status, MemberStatus::Active);
    assert!(record.roster.end_date.is_none());
    assert!(record.is_consistent());
}

#[tokio::test]
async fn test_supervisor_must_exist() {
    let t = setup().await;
    let mut input = phd("a@x.com", "+1000", "ID1", "PP1");
    input.details = TypeDetails::PhdCandidate(CandidateDetails {
        supervisor_id: Some(id("P01MVSD")),
        ..Default::default()
    });
    let err = t.registry.create_member(input.clone()).await.unwrap_err();
    assert!(err.is_validation());
    assert_eq!(t.count("SELECT COUNT(*) FROM members").await, 0);

    let prof = t
        .registry
        .create_member(professor("p@lab.org"))
        .await
        .unwrap();
    assert_eq!(prof.to_string(), "P01MVSD");
    let member = t.registry.create_member(input).await.unwrap();
    let record = t.registry.get_member(member).await.unwrap();
    assert_eq!(record.profile.profile.details.referenced_professor(), Some(prof));
}

#[tokio::test]
async fn test_id_widens_past_two_digits() {
    let t = setup().await;
    sqlx::query("INSERT INTO member_sequences (member_type, last_number) VALUES ('director', 99)")
        .execute(t.registry.pool())
        .await
        .unwrap();

    let director = |email: &str| {
        let mut input = staff(email);
        input.details = TypeDetails::Director(DirectorDetails {
            designation: "Lab Director".into(),
            message: None,
        });
        input
    };

    let first = t.registry.create_member(director("d1@lab.org")).await.unwrap();
    let second = t.registry.create_member(director("d2@lab.org")).await.unwrap();
    assert_eq!(first.to_string(), "D100MVSD");
    assert_eq!(second.to_string(), "D101MVSD");

    let roster = t
        .registry
        .list_roster(RosterFilter {
            member_type: Some(MemberType::Director),
            status: None,
        })
        .await
        .unwrap();
    let ids: Vec<String> = roster.iter().map(|r| r.id.to_string()).collect();
    assert_eq!(ids, vec!["D100MVSD", "D101MVSD"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_get_unique_ids() {
    let t = setup().await;
    let registry = t.registry.clone();

    let tasks = (0..8).map(|i| {
        let registry = registry.clone();
        async move { registry.create_member(staff(&format!("s{i}@lab.org"))).await }
    });
    let results = futures::future::join_all(tasks).await;

    let mut ids: Vec<String> = results
        .into_iter()
        .map(|r| r.unwrap().to_string())
        .collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 8);
    assert_eq!(t.count("SELECT COUNT(*) FROM staff_members").await, 8);
    assert_eq!(
        t.count("SELECT last_number FROM member_sequences WHERE member_type = 'staff_member'")
            .await,
        8
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_same_email_admits_one() {
    let t = setup().await;

    let tasks = (0..5).map(|_| {
        let registry = t.registry.clone();
        async move { registry.create_member(staff("same@lab.org")).await }
    });
    let results = futures::future::join_all(tasks).await;

    let ok = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(ok, 1);
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert!(err.conflict_report().is_some(), "unexpected error: {err}");
    }
    assert_eq!(t.count("SELECT COUNT(*) FROM members").await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_create_and_update_racing_for_phone_admit_one() {
    let t = setup().await;
    let existing = t
        .registry
        .create_member(staff("s@lab.org"))
        .await
        .unwrap();

    let creating = {
        let registry = t.registry.clone();
        async move {
            registry
                .create_member(phd("a@x.com", "+5000", "ID1", "PP1"))
                .await
                .map(|_| ())
        }
    };
    let updating = {
        let registry = t.registry.clone();
        async move {
            let patch = MemberPatch {
                phone: Some("+5000".into()),
                ..Default::default()
            };
            registry.update_member(existing, patch).await
        }
    };
    let (created, updated) = tokio::join!(creating, updating);

    assert_eq!(created.is_ok() as u8 + updated.is_ok() as u8, 1);
    for err in [created.err(), updated.err()].into_iter().flatten() {
        assert!(err.conflict_report().is_some(), "unexpected error: {err}");
    }
    assert_eq!(
        t.count("SELECT COUNT(*) FROM members WHERE phone = '+5000'").await,
        1
    );
    assert_eq!(
        t.count(
            "SELECT (SELECT COUNT(*) FROM phd_candidates WHERE phone = '+5000') \
             + (SELECT COUNT(*) FROM staff_members WHERE phone = '+5000')"
        )
        .await,
        1
    );
}

#[tokio::test]
async fn test_login() {
    let t = setup().await;
    let member = t
        .registry
        .create_member(staff("s@lab.org"))
        .await
        .unwrap();

    let row = t
        .registry
        .verify_credentials("S@Lab.org", STRONG_PASSWORD)
        .await
        .unwrap();
    assert_eq!(row.id, member);

    assert!(matches!(
        t.registry.verify_credentials("s@lab.org", "Wr0ng!pass").await,
        Err(RegistryError::InvalidCredentials)
    ));
    assert!(matches!(
        t.registry.verify_credentials("nobody@lab.org", STRONG_PASSWORD).await,
        Err(RegistryError::InvalidCredentials)
    ));

    let deactivate = MemberPatch {
        status: Some(MemberStatus::Inactive),
        end_date: Some(date(2025, 1, 31)),
        ..Default::default()
    };
    t.registry.update_member(member, deactivate).await.unwrap();
    assert!(matches!(
        t.registry.verify_credentials("s@lab.org", STRONG_PASSWORD).await,
        Err(RegistryError::AccountDisabled(id)) if id == member
    ));
}

#[tokio::test]
async fn test_password_change_applies_to_login() {
    let t = setup().await;
    let member = t
        .registry
        .create_member(staff("s@lab.org"))
        .await
        .unwrap();

    let patch = MemberPatch {
        password: Some("N3w!password".into()),
        ..Default::default()
    };
    t.registry.update_member(member, patch).await.unwrap();

    assert!(
        t.registry
            .verify_credentials("s@lab.org", "N3w!password")
            .await
            .is_ok()
    );
    let record = t.registry.get_member(member).await.unwrap();
    assert!(record.is_consistent());
}

#[tokio::test]
async fn test_notifications_feed() {
    let t = setup().await;
    let member = t
        .registry
        .create_member(staff("s@lab.org"))
        .await
        .unwrap();
    let patch = MemberPatch {
        biography: Some("Keeps the lab running".into()),
        ..Default::default()
    };
    t.registry.update_member(member, patch).await.unwrap();

    let all = t.registry.list_notifications(Some(member), false).await.unwrap();
    assert_eq!(all.len(), 2);
    assert!(all[0].title.contains("updated"));

    let read = t.registry.mark_notification_read(all[1].id).await.unwrap();
    assert_eq!(read.status, NotificationStatus::Read);

    let unread = t.registry.list_notifications(None, true).await.unwrap();
    assert_eq!(unread.len(), 1);
    assert_eq!(unread[0].id, all[0].id);

    assert!(matches!(
        t.registry.mark_notification_read(9999).await,
        Err(RegistryError::NotificationNotFound(9999))
    ));
}

#[tokio::test]
async fn test_notification_failure_does_not_fail_create() {
    let t = setup_with_emitter(Some(Arc::new(FailingEmitter))).await;
    let member = t
        .registry
        .create_member(staff("s@lab.org"))
        .await
        .unwrap();
    assert_eq!(t.count("SELECT COUNT(*) FROM notifications").await, 1);
    assert!(t.registry.get_member(member).await.is_ok());
}

#[tokio::test]
async fn test_update_unknown_member() {
    let t = setup().await;
    let patch = MemberPatch {
        first_name: Some("Ghost".into()),
        ..Default::default()
    };
    assert!(matches!(
        t.registry.update_member(id("STF07MVSD"), patch).await,
        Err(RegistryError::NotFound(_))
    ));
    assert!(matches!(
        t.registry.get_member(id("STF07MVSD")).await,
        Err(RegistryError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_roster_listing_filters() {
    let t = setup().await;
    t.registry.create_member(staff("s1@lab.org")).await.unwrap();
    t.registry.create_member(professor("p1@lab.org")).await.unwrap();
    let s2 = t.registry.create_member(staff("s2@lab.org")).await.unwrap();
    let deactivate = MemberPatch {
        status: Some(MemberStatus::Inactive),
        end_date: Some(date(2025, 1, 31)),
        ..Default::default()
    };
    t.registry.update_member(s2, deactivate).await.unwrap();

    let all = t.registry.list_roster(RosterFilter::default()).await.unwrap();
    assert_eq!(all.len(), 3);

    let staff_rows = t
        .registry
        .list_roster(RosterFilter {
            member_type: Some(MemberType::StaffMember),
            status: None,
        })
        .await
        .unwrap();
    let ids: Vec<String> = staff_rows.iter().map(|r| r.id.to_string()).collect();
    assert_eq!(ids, vec!["STF01MVSD", "STF02MVSD"]);

    let inactive = t
        .registry
        .list_roster(RosterFilter {
            member_type: None,
            status: Some(MemberStatus::Inactive),
        })
        .await
        .unwrap();
    assert_eq!(inactive.len(), 1);
    assert_eq!(inactive[0].id, s2);
}
