use std::sync::Arc;

use domains::{Caller, DomainError, SiteRepository};
use integration_tests::{draft, seeded_stores, user};
use services::SiteService;
use uuid::Uuid;

#[tokio::test]
async fn a_stale_copy_cannot_overwrite_a_newer_save() {
    let (sites, _users, seeded) = seeded_stores("Cliffside").await;
    let now = chrono::Utc::now();

    let mut first = sites.find_by_id(seeded.id).await.unwrap().unwrap();
    let mut second = sites.find_by_id(seeded.id).await.unwrap().unwrap();
    services::comment_manager::append(&mut first, Uuid::now_v7(), draft(5, "first"), now).unwrap();
    services::comment_manager::append(&mut second, Uuid::now_v7(), draft(1, "second"), now).unwrap();

    let saved = sites.save(&first).await.unwrap();
    assert_eq!(saved.revision, seeded.revision + 1);

    let err = sites.save(&second).await.unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)), "{err:?}");

    let stored = sites.find_by_id(seeded.id).await.unwrap().unwrap();
    assert_eq!(stored.comments.len(), 1);
    assert_eq!(stored.comments[0].text, "first");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_comment_appends_never_lose_an_acknowledged_write() {
    let (sites, users, seeded) = seeded_stores("Cliffside").await;
    let service = Arc::new(SiteService::new(sites.clone(), users.clone()));

    let mut tasks = Vec::new();
    for n in 0..32 {
        let author = user(&format!("camper{n}"), false);
        users.insert(author.clone());
        let service = service.clone();
        let site_id = seeded.id;
        tasks.push(tokio::spawn(async move {
            service
                .add_comment(&Caller::new(author.id, false), site_id, draft(4, &format!("visit {n}")))
                .await
        }));
    }

    let mut acknowledged = Vec::new();
    for task in tasks {
        match task.await.unwrap() {
            Ok(view) => acknowledged.push(view.revision),
            Err(DomainError::Conflict(_)) => {}
            Err(other) => panic!("unexpected failure: {other:?}"),
        }
    }
    assert!(!acknowledged.is_empty());

    let stored = sites.find_by_id(seeded.id).await.unwrap().unwrap();
    assert_eq!(stored.comments.len(), acknowledged.len());
    assert_eq!(stored.revision, seeded.revision + acknowledged.len() as i64);
}

#[tokio::test]
async fn renaming_onto_a_taken_name_conflicts_and_keeps_both_sites() {
    let (sites, users, cliffside) = seeded_stores("Cliffside").await;
    let service = SiteService::new(sites.clone(), users.clone());
    let admin = Caller::new(Uuid::now_v7(), true);
    let lakeside = service
        .create_site(&admin, integration_tests::new_site("Lakeside"))
        .await
        .unwrap();

    let patch = domains::SitePatch {
        name: Some("CLIFFSIDE".into()),
        ..Default::default()
    };
    let err = service.update_site(&admin, lakeside.id, patch).await.unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)), "{err:?}");

    let names: Vec<String> = sites.list_all().await.unwrap().into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec![cliffside.name, "Lakeside".to_string()]);
}
