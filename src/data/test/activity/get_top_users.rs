use super::*;

async fn seed(db: &sea_orm::DatabaseConnection) -> Result<(), DbErr> {
    // user id, text points, voice points
    let rows = [
        ("1", 50, 0),
        ("2", 400, 12),
        ("3", 0, 90),
        ("4", 250, 0),
        ("5", 250, 44),
    ];
    for (user_id, points, voice_points) in rows {
        factory::activity::ActivityFactory::new(db)
            .user_id(user_id)
            .points(points)
            .voice_points(voice_points)
            .build()
            .await?;
    }
    Ok(())
}

/// Tests ordering and the positive-balance filter for text points.
///
/// Expected: users 2, 4, 5, 1 with user 3 excluded
#[tokio::test]
async fn orders_text_leaderboard_descending() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_activity_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();
    seed(db).await?;

    let repo = ActivityRepository::new(db);
    let page = repo.get_top_users(1, ActivityKind::Text, 10).await.unwrap();

    let ids: Vec<u64> = page.users.iter().map(|u| u.user_id).collect();
    assert_eq!(ids, vec![2, 4, 5, 1]);
    assert_eq!(page.total_pages, 1);
    assert_eq!(page.current_page, 1);

    Ok(())
}

/// Tests the voice leaderboard.
///
/// Expected: users 3, 5, 2 only
#[tokio::test]
async fn orders_voice_leaderboard_descending() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_activity_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();
    seed(db).await?;

    let repo = ActivityRepository::new(db);
    let page = repo.get_top_users(1, ActivityKind::Voice, 10).await.unwrap();

    let ids: Vec<u64> = page.users.iter().map(|u| u.user_id).collect();
    assert_eq!(ids, vec![3, 5, 2]);

    Ok(())
}

/// Tests pagination metadata and page contents.
///
/// Expected: 4 matching users at 3 per page gives 2 pages, second page holds user 1
#[tokio::test]
async fn paginates_with_ceiling_page_count() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_activity_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();
    seed(db).await?;

    let repo = ActivityRepository::new(db);
    let page = repo.get_top_users(2, ActivityKind::Text, 3).await.unwrap();

    assert_eq!(page.total_pages, 2);
    assert_eq!(page.current_page, 2);
    assert_eq!(page.users.len(), 1);
    assert_eq!(page.users[0].user_id, 1);

    Ok(())
}

/// Tests that page zero is treated as the first page.
///
/// Expected: current_page 1
#[tokio::test]
async fn clamps_page_zero() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_activity_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();
    seed(db).await?;

    let repo = ActivityRepository::new(db);
    let page = repo.get_top_users(0, ActivityKind::Text, 2).await.unwrap();

    assert_eq!(page.current_page, 1);
    assert_eq!(page.users.len(), 2);

    Ok(())
}

/// Tests an empty leaderboard.
///
/// Expected: no users and zero pages
#[tokio::test]
async fn empty_table_has_no_pages() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_activity_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = ActivityRepository::new(db);
    let page = repo.get_top_users(1, ActivityKind::Text, 10).await.unwrap();

    assert!(page.users.is_empty());
    assert_eq!(page.total_pages, 0);

    Ok(())
}
