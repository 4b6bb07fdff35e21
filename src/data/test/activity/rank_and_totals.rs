use super::*;

/// Tests rank computation against other users' totals.
///
/// Expected: position counts users with strictly more points, plus one
#[tokio::test]
async fn ranks_by_strictly_greater_totals() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_activity_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    factory::activity::ActivityFactory::new(db)
        .user_id("1")
        .points(500)
        .voice_points(0)
        .build()
        .await?;
    factory::activity::ActivityFactory::new(db)
        .user_id("2")
        .points(300)
        .voice_points(80)
        .build()
        .await?;
    factory::activity::ActivityFactory::new(db)
        .user_id("3")
        .points(300)
        .voice_points(40)
        .build()
        .await?;
    factory::activity::ActivityFactory::new(db)
        .user_id("4")
        .points(100)
        .voice_points(120)
        .build()
        .await?;

    let repo = ActivityRepository::new(db);
    let rank = repo.rank_and_totals(3).await.unwrap().unwrap();

    assert_eq!(rank.points, 300);
    assert_eq!(rank.voice_points, 40);
    // Only user 1 has more text points; user 2 ties
    assert_eq!(rank.position, 2);
    // Users 4 and 2 have more voice points
    assert_eq!(rank.voice_position, 3);

    Ok(())
}

/// Tests the leader of the board.
///
/// Expected: position 1
#[tokio::test]
async fn leader_is_position_one() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_activity_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    factory::activity::ActivityFactory::new(db)
        .user_id("10")
        .points(1000)
        .voice_points(1000)
        .build()
        .await?;
    factory::create_activity(db).await?;

    let repo = ActivityRepository::new(db);
    let rank = repo.rank_and_totals(10).await.unwrap().unwrap();

    assert_eq!(rank.position, 1);
    assert_eq!(rank.voice_position, 1);

    Ok(())
}

/// Tests ranking a user without a stored record.
///
/// Expected: Ok(None)
#[tokio::test]
async fn returns_none_without_record() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_activity_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = ActivityRepository::new(db);

    assert!(repo.rank_and_totals(999).await.unwrap().is_none());

    Ok(())
}
