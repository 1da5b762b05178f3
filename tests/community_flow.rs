use florecer_api::{
    dto::{
        favorites::AddFavoriteRequest,
        posts::{CreatePostRequest, UpdatePostRequest},
        recommendations::CreateRecommendationRequest,
        routines::{CreateRoutineRequest, UpdateRoutineRequest},
    },
    error::AppError,
    routes::params::{Pagination, PostQuery},
    services::{favorite_service, post_service, product_service, recommendation_service, routine_service},
};

mod common;

#[tokio::test]
async fn only_the_author_can_change_a_post() -> anyhow::Result<()> {
    let db = common::setup().await?;
    let state = &db.state;
    let ana = common::register(state, "ana").await?;
    let bea = common::register(state, "bea").await?;

    let post = post_service::create_post(
        state,
        &ana,
        CreatePostRequest {
            title: "My morning routine".into(),
            content: Some("Cleanser, toner, SPF".into()),
            published: true,
        },
    )
    .await?
    .data
    .expect("post");
    assert_eq!(post.author.username, "ana");

    let err = post_service::update_post(
        state,
        &bea,
        post.id,
        UpdatePostRequest {
            title: Some("Hijacked".into()),
            ..Default::default()
        },
    )
    .await
    .err()
    .expect("forbidden update");
    assert!(matches!(err, AppError::Forbidden(msg) if msg == "You can only edit your own posts"));

    let err = post_service::delete_post(state, &bea, post.id)
        .await
        .err()
        .expect("forbidden delete");
    assert!(matches!(err, AppError::Forbidden(_)));

    let unchanged = post_service::get_post(state, post.id).await?.data.expect("post");
    assert_eq!(unchanged.title, "My morning routine");

    let updated = post_service::update_post(
        state,
        &ana,
        post.id,
        UpdatePostRequest {
            published: Some(false),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("post");
    assert_eq!(updated.title, "My morning routine");
    assert!(!updated.published);

    let drafts = post_service::list_posts(
        state,
        PostQuery {
            published: Some(false),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(drafts.meta.and_then(|m| m.total), Some(1));

    post_service::delete_post(state, &ana, post.id).await?;
    let err = post_service::get_post(state, post.id).await.err().expect("gone");
    assert!(matches!(err, AppError::NotFound(_)));
    Ok(())
}

#[tokio::test]
async fn favorites_are_unique_per_product() -> anyhow::Result<()> {
    let db = common::setup().await?;
    let state = &db.state;
    let admin = common::register_admin(state, "admin").await?;
    let ana = common::register(state, "ana").await?;
    let serum = common::create_product(state, &admin, "Serum", 1000).await?;

    favorite_service::add_favorite(&state.pool, &ana, AddFavoriteRequest { product_id: serum.id })
        .await?;
    let err = favorite_service::add_favorite(
        &state.pool,
        &ana,
        AddFavoriteRequest { product_id: serum.id },
    )
    .await
    .err()
    .expect("duplicate favorite");
    assert!(matches!(err, AppError::Conflict(msg) if msg == "Product already in favorites"));

    let list = favorite_service::list_favorites(&state.pool, &ana, Pagination::default()).await?;
    assert_eq!(list.data.expect("favorites").items.len(), 1);

    let check = favorite_service::check_favorite(&state.pool, &ana, serum.id).await?;
    assert!(check.data.expect("check").is_favorite);

    favorite_service::remove_favorite(&state.pool, &ana, serum.id).await?;
    let check = favorite_service::check_favorite(&state.pool, &ana, serum.id).await?;
    assert!(!check.data.expect("check").is_favorite);

    let err = favorite_service::remove_favorite(&state.pool, &ana, serum.id)
        .await
        .err()
        .expect("already removed");
    assert!(matches!(err, AppError::NotFound(_)));
    Ok(())
}

#[tokio::test]
async fn deleting_a_product_drops_its_favorites() -> anyhow::Result<()> {
    let db = common::setup().await?;
    let state = &db.state;
    let admin = common::register_admin(state, "admin").await?;
    let ana = common::register(state, "ana").await?;
    let serum = common::create_product(state, &admin, "Serum", 1000).await?;

    favorite_service::add_favorite(&state.pool, &ana, AddFavoriteRequest { product_id: serum.id })
        .await?;
    product_service::delete_product(state, &admin, serum.id).await?;

    let list = favorite_service::list_favorites(&state.pool, &ana, Pagination::default()).await?;
    assert!(list.data.expect("favorites").items.is_empty());
    Ok(())
}

#[tokio::test]
async fn routines_belong_to_their_owner() -> anyhow::Result<()> {
    let db = common::setup().await?;
    let state = &db.state;
    let ana = common::register(state, "ana").await?;
    let bea = common::register(state, "bea").await?;

    let steps = vec![
        "Cleanser".to_string(),
        "Toner".to_string(),
        "Serum".to_string(),
        "SPF".to_string(),
    ];
    let routine = routine_service::create_routine(
        state,
        &ana,
        CreateRoutineRequest {
            name: "Morning".into(),
            kind: Some("skincare".into()),
            steps: steps.clone(),
        },
    )
    .await?
    .data
    .expect("routine");
    assert_eq!(routine.steps, steps);

    let err = routine_service::get_routine(state, &bea, routine.id)
        .await
        .err()
        .expect("not the owner");
    assert!(matches!(err, AppError::Forbidden(_)));
    let listed = routine_service::list_routines(state, &bea).await?;
    assert!(listed.data.expect("routines").items.is_empty());

    let updated = routine_service::update_routine(
        state,
        &ana,
        routine.id,
        UpdateRoutineRequest {
            steps: Some(vec!["SPF".into(), "Cleanser".into()]),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("routine");
    assert_eq!(updated.name, "Morning");
    assert_eq!(updated.steps, vec!["SPF".to_string(), "Cleanser".to_string()]);

    let err = routine_service::create_routine(
        state,
        &ana,
        CreateRoutineRequest {
            name: "   ".into(),
            kind: None,
            steps: Vec::new(),
        },
    )
    .await
    .err()
    .expect("blank name");
    assert!(matches!(err, AppError::BadRequest(_)));

    routine_service::delete_routine(state, &ana, routine.id).await?;
    let err = routine_service::get_routine(state, &ana, routine.id)
        .await
        .err()
        .expect("deleted");
    assert!(matches!(err, AppError::NotFound(_)));
    Ok(())
}

#[tokio::test]
async fn recommendations_flow_from_admin_to_recipient() -> anyhow::Result<()> {
    let db = common::setup().await?;
    let state = &db.state;
    let admin = common::register_admin(state, "admin").await?;
    let ana = common::register(state, "ana").await?;
    let bea = common::register(state, "bea").await?;
    let serum = common::create_product(state, &admin, "Serum", 1000).await?;

    let request = || CreateRecommendationRequest {
        user_id: ana.user_id,
        product_id: serum.id,
        message: Some("Great for dry skin".into()),
    };

    let err = recommendation_service::create_recommendation(&state.pool, &bea, request())
        .await
        .err()
        .expect("users cannot recommend");
    assert!(matches!(err, AppError::Forbidden(_)));

    let created = recommendation_service::create_recommendation(&state.pool, &admin, request())
        .await?
        .data
        .expect("recommendation");
    assert!(!created.is_read);

    let mine = recommendation_service::list_for_user(&state.pool, &ana).await?;
    let items = mine.data.expect("list").items;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "Serum");
    assert_eq!(items[0].admin_username, "admin");
    assert!(
        recommendation_service::list_for_user(&state.pool, &bea)
            .await?
            .data
            .expect("list")
            .items
            .is_empty()
    );

    let err = recommendation_service::list_all(&state.pool, &ana)
        .await
        .err()
        .expect("admin only");
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = recommendation_service::mark_read(&state.pool, &bea, created.id)
        .await
        .err()
        .expect("not the recipient");
    assert!(matches!(err, AppError::Forbidden(_)));

    let read = recommendation_service::mark_read(&state.pool, &ana, created.id)
        .await?
        .data
        .expect("recommendation");
    assert!(read.is_read);

    let err = recommendation_service::create_recommendation(
        &state.pool,
        &admin,
        CreateRecommendationRequest {
            user_id: 9999,
            product_id: serum.id,
            message: None,
        },
    )
    .await
    .err()
    .expect("unknown user");
    assert!(matches!(err, AppError::NotFound(_)));
    Ok(())
}

#[tokio::test]
async fn marking_a_removed_recommendation_is_not_found() -> anyhow::Result<()> {
    let db = common::setup().await?;
    let state = &db.state;
    let admin = common::register_admin(state, "admin").await?;
    let ana = common::register(state, "ana").await?;
    let serum = common::create_product(state, &admin, "Serum", 1000).await?;

    let created = recommendation_service::create_recommendation(
        &state.pool,
        &admin,
        CreateRecommendationRequest {
            user_id: ana.user_id,
            product_id: serum.id,
            message: None,
        },
    )
    .await?
    .data
    .expect("recommendation");

    // Deleting the product cascades to its recommendations.
    product_service::delete_product(state, &admin, serum.id).await?;

    let err = recommendation_service::mark_read(&state.pool, &ana, created.id)
        .await
        .err()
        .expect("recommendation is gone");
    assert!(matches!(err, AppError::NotFound(_)));
    Ok(())
}
