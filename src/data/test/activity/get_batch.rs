use super::*;

/// Tests scanning the table batch by batch.
///
/// Expected: batches partition the table in user id order
#[tokio::test]
async fn scans_in_batches() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_activity_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    for user_id in ["11", "12", "13"] {
        factory::activity::ActivityFactory::new(db)
            .user_id(user_id)
            .build()
            .await?;
    }

    let repo = ActivityRepository::new(db);
    let first = repo.get_batch(0, 2).await.unwrap();
    let second = repo.get_batch(1, 2).await.unwrap();
    let third = repo.get_batch(2, 2).await.unwrap();

    assert_eq!(
        first.iter().map(|r| r.user_id).collect::<Vec<_>>(),
        vec![11, 12]
    );
    assert_eq!(
        second.iter().map(|r| r.user_id).collect::<Vec<_>>(),
        vec![13]
    );
    assert!(third.is_empty());

    Ok(())
}
