use super::*;

/// Tests inserting new rows and updating existing rows in one call.
///
/// Expected: both rows hold the flushed values
#[tokio::test]
async fn inserts_and_updates_rows() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_activity_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    factory::activity::ActivityFactory::new(db)
        .user_id("1")
        .points(10)
        .version(1)
        .build()
        .await?;

    let mut existing = ActivityRecord::new(1, "renamed");
    existing.points = 55;
    existing.version = 4;
    let mut fresh = ActivityRecord::new(2, "newcomer");
    fresh.voice_points = 8;
    fresh.version = 1;

    let repo = ActivityRepository::new(db);
    let written = repo.bulk_upsert(vec![existing, fresh], Utc::now()).await?;

    assert_eq!(written, 2);
    assert_eq!(entity::prelude::Activity::find().count(db).await?, 2);

    let updated = repo.find_by_user_id(1).await.unwrap().unwrap();
    assert_eq!(updated.user_name, "renamed");
    assert_eq!(updated.points, 55);
    assert_eq!(updated.version, 4);

    let inserted = repo.find_by_user_id(2).await.unwrap().unwrap();
    assert_eq!(inserted.voice_points, 8);

    let row = entity::prelude::Activity::find_by_id("2".to_string())
        .one(db)
        .await?
        .unwrap();
    assert!(row.last_update.is_some());

    Ok(())
}

/// Tests that an empty batch is a no-op.
///
/// Expected: Ok(0)
#[tokio::test]
async fn empty_batch_writes_nothing() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_activity_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = ActivityRepository::new(db);

    assert_eq!(repo.bulk_upsert(Vec::new(), Utc::now()).await?, 0);

    Ok(())
}

/// Tests that a failing write surfaces as an error.
///
/// Expected: Err when the activity table does not exist
#[tokio::test]
async fn fails_without_table() -> Result<(), DbErr> {
    let test = TestBuilder::new().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = ActivityRepository::new(db);
    let result = repo
        .bulk_upsert(vec![ActivityRecord::new(1, "user")], Utc::now())
        .await;

    assert!(result.is_err());

    Ok(())
}
