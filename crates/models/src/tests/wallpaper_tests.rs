use anyhow::Result;
use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use sea_orm::{DatabaseConnection, EntityTrait};
use uuid::Uuid;

use crate::{db::connect, wallpaper};

async fn setup_test_db() -> Option<DatabaseConnection> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return None;
    }
    let db = match connect().await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("skip: cannot connect to db: {}", e);
            return None;
        }
    };
    if let Err(e) = Migrator::up(&db, None).await {
        eprintln!("skip: migrate up failed: {}", e);
        return None;
    }
    Some(db)
}

fn sample(category: &str) -> wallpaper::CreateWallpaper {
    wallpaper::CreateWallpaper {
        title: format!("Model Test {}", Uuid::new_v4()),
        description: Some("  ".into()),
        category: category.into(),
        tags: vec!["one".into(), "two".into()],
        resolution: "1920x1080".into(),
        image_url: "https://example.com/a.jpg".into(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_create_defaults_and_find() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let before = Utc::now();
    let created = wallpaper::create(&db, sample("ModelTest")).await?;
    assert_eq!(created.downloads, 0);
    assert!(created.description.is_none());
    assert!(created.uploaded_at.timestamp() >= before.timestamp() - 1);

    let found = wallpaper::Entity::find_by_id(created.id).one(&db).await?;
    let found = found.expect("row exists");
    assert_eq!(found.tags, vec!["one".to_string(), "two".to_string()]);

    wallpaper::Entity::delete_by_id(created.id).exec(&db).await?;
    Ok(())
}

#[tokio::test]
async fn test_create_rejects_blank_title() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };
    let mut input = sample("ModelTest");
    input.title = "   ".into();
    assert!(wallpaper::create(&db, input).await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_increment_downloads_concurrently() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };
    let created = wallpaper::create(&db, sample("ModelTest")).await?;

    let mut handles = Vec::new();
    for _ in 0..16 {
        let db = db.clone();
        let id = created.id;
        handles.push(tokio::spawn(async move { wallpaper::increment_downloads(&db, id, 1).await }));
    }
    for h in handles {
        assert!(h.await??.is_some());
    }

    let found = wallpaper::Entity::find_by_id(created.id).one(&db).await?.expect("row exists");
    assert_eq!(found.downloads, 16);

    let missing = wallpaper::increment_downloads(&db, Uuid::new_v4(), 1).await?;
    assert!(missing.is_none());

    wallpaper::Entity::delete_by_id(created.id).exec(&db).await?;
    Ok(())
}

#[tokio::test]
async fn test_distinct_categories_sorted() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };
    let suffix = Uuid::new_v4().simple().to_string();
    let b = wallpaper::create(&db, sample(&format!("zz-{suffix}"))).await?;
    let a1 = wallpaper::create(&db, sample(&format!("aa-{suffix}"))).await?;
    let a2 = wallpaper::create(&db, sample(&format!("aa-{suffix}"))).await?;

    let cats = wallpaper::distinct_categories(&db).await?;
    let ours: Vec<&String> = cats.iter().filter(|c| c.ends_with(&suffix)).collect();
    assert_eq!(ours, vec![&format!("aa-{suffix}"), &format!("zz-{suffix}")]);

    for id in [a1.id, a2.id, b.id] {
        wallpaper::Entity::delete_by_id(id).exec(&db).await?;
    }
    Ok(())
}
