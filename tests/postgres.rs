// Store invariants against a real PostgreSQL. Skipped unless TEST_DATABASE_URL is set, e.g.
// TEST_DATABASE_URL=postgres://localhost/workshops_test cargo test --test postgres

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use workshop_hub::dto::{NewUser, NewWorkshop, StudentRegistration, WorkshopPatch};
use workshop_hub::models::Role;
use workshop_hub::{apply_migrations, AppError, PgStore, Store};

static SCHEMA_SEQ: AtomicU32 = AtomicU32::new(0);

/// Fresh schema per test so tests can run in parallel against one database.
async fn store() -> Option<PgStore> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(8)
        .connect(&url)
        .await
        .expect("connect to TEST_DATABASE_URL");
    let schema = format!(
        "wh_test_{}_{}",
        std::process::id(),
        SCHEMA_SEQ.fetch_add(1, Ordering::SeqCst)
    );
    sqlx::query(&format!("DROP SCHEMA IF EXISTS \"{}\" CASCADE", schema))
        .execute(&pool)
        .await
        .unwrap();
    apply_migrations(&pool, &schema).await.unwrap();
    Some(PgStore::new(pool, schema))
}

async fn drop_schema(store: &PgStore) {
    sqlx::query(&format!("DROP SCHEMA IF EXISTS \"{}\" CASCADE", store.schema()))
        .execute(store.pool())
        .await
        .unwrap();
}

fn workshop(capacity: i32) -> NewWorkshop {
    NewWorkshop {
        title: "UX basics".into(),
        description: "Intro to UX".into(),
        date: "2025-01-20".into(),
        time: "14:00".into(),
        location: "Room 3".into(),
        category: "Design".into(),
        capacity,
        status: "active".into(),
    }
}

fn student(email: &str) -> StudentRegistration {
    StudentRegistration {
        name: "Student".into(),
        email: email.into(),
    }
}

#[tokio::test]
async fn crud_roundtrip() {
    let Some(store) = store().await else { return };
    let created = store.create_workshop(&workshop(4)).await.unwrap();
    assert_eq!(created.enrolled, 0);
    let fetched = store.get_workshop(created.id).await.unwrap().unwrap();
    assert_eq!(fetched, created);

    let patch = WorkshopPatch {
        status: Some("cancelled".into()),
        ..Default::default()
    };
    let updated = store.update_workshop(created.id, &patch).await.unwrap().unwrap();
    assert_eq!(updated.status, "cancelled");
    assert_eq!(updated.title, created.title);
    assert!(store.update_workshop(created.id + 1000, &patch).await.unwrap().is_none());

    assert_eq!(store.list_workshops(Some("cancelled")).await.unwrap().len(), 1);
    assert!(store.list_workshops(Some("active")).await.unwrap().is_empty());
    drop_schema(&store).await;
}

#[tokio::test]
async fn capacity_and_duplicates_enforced() {
    let Some(store) = store().await else { return };
    let w = store.create_workshop(&workshop(1)).await.unwrap();
    let enrollment = store.register_student(w.id, &student("a@x.com")).await.unwrap();
    assert_eq!(enrollment.workshop.enrolled, 1);

    let err = store.register_student(w.id, &student("b@x.com")).await.unwrap_err();
    assert!(matches!(err, AppError::CapacityExceeded));

    let roomy = store.create_workshop(&workshop(5)).await.unwrap();
    store.register_student(roomy.id, &student("a@x.com")).await.unwrap();
    let err = store.register_student(roomy.id, &student("a@x.com")).await.unwrap_err();
    assert!(matches!(err, AppError::DuplicateRegistration));
    assert_eq!(store.list_attendees(roomy.id).await.unwrap().unwrap().len(), 1);
    // b@x.com was rejected before any account was created.
    assert_eq!(store.list_users().await.unwrap().len(), 1);
    drop_schema(&store).await;
}

#[tokio::test]
async fn delete_cascades() {
    let Some(store) = store().await else { return };
    let w = store.create_workshop(&workshop(5)).await.unwrap();
    store.register_student(w.id, &student("a@x.com")).await.unwrap();
    store.register_student(w.id, &student("b@x.com")).await.unwrap();
    assert!(store.delete_workshop(w.id).await.unwrap());

    let (orphans,): (i64,) = sqlx::query_as(&format!(
        "SELECT COUNT(*) FROM \"{}\".\"registrations\" WHERE workshop_id = $1",
        store.schema()
    ))
    .bind(w.id)
    .fetch_one(store.pool())
    .await
    .unwrap();
    assert_eq!(orphans, 0);
    assert!(!store.delete_workshop(w.id).await.unwrap());
    drop_schema(&store).await;
}

#[tokio::test]
async fn concurrent_last_seat_and_same_pair() {
    let Some(store) = store().await else { return };
    let store = Arc::new(store);
    let w = store.create_workshop(&workshop(1)).await.unwrap();
    let id = w.id;

    let mut handles = Vec::new();
    for i in 0..6 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store.register_student(id, &student(&format!("s{}@x.com", i))).await
        }));
    }
    let mut winners = 0;
    for h in handles {
        match h.await.unwrap() {
            Ok(_) => winners += 1,
            Err(e) => assert!(matches!(e, AppError::CapacityExceeded), "unexpected {:?}", e),
        }
    }
    assert_eq!(winners, 1);

    let roomy = store.create_workshop(&workshop(10)).await.unwrap().id;
    let mut handles = Vec::new();
    for _ in 0..4 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store.register_student(roomy, &student("same@x.com")).await
        }));
    }
    let mut ok = 0;
    for h in handles {
        match h.await.unwrap() {
            Ok(_) => ok += 1,
            Err(e) => assert!(matches!(e, AppError::DuplicateRegistration), "unexpected {:?}", e),
        }
    }
    assert_eq!(ok, 1);
    assert_eq!(store.get_workshop(roomy).await.unwrap().unwrap().enrolled, 1);
    drop_schema(&store).await;
}

#[tokio::test]
async fn users_unique_by_email() {
    let Some(store) = store().await else { return };
    let new = NewUser {
        name: "Admin".into(),
        email: "admin@x.com".into(),
        password: "admin123".into(),
        role: Role::Admin,
    };
    let user = store.create_user(&new).await.unwrap();
    assert_eq!(user.role, Role::Admin);
    assert!(matches!(store.create_user(&new).await, Err(AppError::DuplicateEmail)));

    let creds = workshop_hub::dto::Credentials {
        email: "admin@x.com".into(),
        password: "admin123".into(),
    };
    assert!(store.find_by_credentials(&creds).await.unwrap().is_some());
    let wrong = workshop_hub::dto::Credentials {
        password: "nope".into(),
        ..creds
    };
    assert!(store.find_by_credentials(&wrong).await.unwrap().is_none());
    drop_schema(&store).await;
}
