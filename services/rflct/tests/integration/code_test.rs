use std::collections::HashSet;

use uuid::Uuid;

use foodime_core::pagination::PageRequest;
use foodime_rflct::domain::repository::CodeRepository;
use foodime_rflct::domain::types::{
    BATCH_CAP, CodeFilter, CodeType, RECENT_ACTIVITY_LIMIT, SINGLE_GENERATION_RETRIES,
    is_valid_code_format,
};
use foodime_rflct::error::RflctServiceError;
use foodime_rflct::usecase::code::{
    CodeAnalyticsUseCase, DeactivateCodeUseCase, GenerateBatchUseCase, IssueCodeInput,
    IssueCodeUseCase, ListCodesUseCase, MyCodesUseCase, RedeemCodeUseCase, generate_unique_code,
};

use crate::helpers::MemoryCodeRepo;

fn issue_input(code_type: CodeType) -> IssueCodeInput {
    IssueCodeInput {
        code_type,
        description: None,
        metadata: None,
        user_id: None,
    }
}

#[tokio::test]
async fn should_never_issue_duplicate_codes() {
    let repo = MemoryCodeRepo::new();
    let mut seen = HashSet::new();
    // 1000 codes out of a 9000-value space; the uniqueness constraint plus
    // retry budget must keep every reservation distinct.
    for _ in 0..1000 {
        let code = generate_unique_code(&repo, SINGLE_GENERATION_RETRIES)
            .await
            .unwrap();
        assert!(is_valid_code_format(&code), "bad code format: {code}");
        assert!(seen.insert(code.clone()), "duplicate code issued: {code}");
    }
    assert_eq!(repo.record_count(), 1000);
}

#[tokio::test]
async fn should_walk_a_promotion_code_through_its_lifecycle() {
    let repo = MemoryCodeRepo::new();
    let issued = IssueCodeUseCase { repo: repo.clone() }
        .execute(IssueCodeInput {
            code_type: CodeType::Promotion,
            description: Some("10% off".to_owned()),
            metadata: None,
            user_id: None,
        })
        .await
        .unwrap();
    assert_eq!(issued.code_type, CodeType::Promotion);
    assert_eq!(issued.usage_count, 0);
    assert!(issued.is_active);
    assert!(issued.last_used_at.is_none());

    let redeemed = RedeemCodeUseCase { repo: repo.clone() }
        .execute(&issued.code, None)
        .await
        .unwrap();
    assert_eq!(redeemed.usage_count, 1);
    assert!(redeemed.last_used_at.is_some());

    DeactivateCodeUseCase { repo: repo.clone() }
        .execute(&issued.code)
        .await
        .unwrap();

    let result = RedeemCodeUseCase { repo: repo.clone() }
        .execute(&issued.code, None)
        .await;
    assert!(
        matches!(result, Err(RflctServiceError::CodeInactive)),
        "expected CodeInactive, got {result:?}"
    );

    // Deactivation blocks redemption but never touches the counter.
    let record = repo.find_by_code(&issued.code).await.unwrap().unwrap();
    assert_eq!(record.usage_count, 1);
}

#[tokio::test]
async fn should_fail_with_not_found_for_unknown_code() {
    let uc = RedeemCodeUseCase {
        repo: MemoryCodeRepo::new(),
    };
    let result = uc.execute("4321", None).await;
    assert!(
        matches!(result, Err(RflctServiceError::CodeNotFound)),
        "expected CodeNotFound, got {result:?}"
    );
}

#[tokio::test]
async fn should_fail_with_inactive_regardless_of_prior_usage() {
    let repo = MemoryCodeRepo::new();
    let issued = IssueCodeUseCase { repo: repo.clone() }
        .execute(issue_input(CodeType::FeatureUnlock))
        .await
        .unwrap();

    let redeem = RedeemCodeUseCase { repo: repo.clone() };
    for _ in 0..3 {
        redeem.execute(&issued.code, None).await.unwrap();
    }
    DeactivateCodeUseCase { repo: repo.clone() }
        .execute(&issued.code)
        .await
        .unwrap();

    let result = redeem.execute(&issued.code, None).await;
    assert!(matches!(result, Err(RflctServiceError::CodeInactive)));
}

#[tokio::test]
async fn should_count_every_concurrent_redemption_exactly_once() {
    let repo = MemoryCodeRepo::new();
    let issued = IssueCodeUseCase { repo: repo.clone() }
        .execute(issue_input(CodeType::SpecialAction))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..25 {
        let repo = repo.clone();
        let code = issued.code.clone();
        handles.push(tokio::spawn(async move {
            RedeemCodeUseCase { repo }.execute(&code, None).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let record = repo.find_by_code(&issued.code).await.unwrap().unwrap();
    assert_eq!(record.usage_count, 25, "lost updates under concurrency");
}

#[tokio::test]
async fn should_bind_owner_on_first_redemption_only() {
    let repo = MemoryCodeRepo::new();
    let issued = IssueCodeUseCase { repo: repo.clone() }
        .execute(issue_input(CodeType::UserAccess))
        .await
        .unwrap();
    assert!(issued.user_id.is_none());

    let first_caller = Uuid::new_v4();
    let second_caller = Uuid::new_v4();
    let redeem = RedeemCodeUseCase { repo: repo.clone() };

    let bound = redeem.execute(&issued.code, Some(first_caller)).await.unwrap();
    assert_eq!(bound.user_id, Some(first_caller));

    let rebound = redeem
        .execute(&issued.code, Some(second_caller))
        .await
        .unwrap();
    assert_eq!(
        rebound.user_id,
        Some(first_caller),
        "owner must not be rebound on later redemptions"
    );

    // The bound code shows up under the first caller's codes.
    let mine = MyCodesUseCase { repo: repo.clone() }
        .execute(first_caller)
        .await
        .unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].code, issued.code);
}

#[tokio::test]
async fn should_treat_deactivation_as_idempotent() {
    let repo = MemoryCodeRepo::new();
    let issued = IssueCodeUseCase { repo: repo.clone() }
        .execute(issue_input(CodeType::Promotion))
        .await
        .unwrap();

    let uc = DeactivateCodeUseCase { repo: repo.clone() };
    uc.execute(&issued.code).await.unwrap();
    // Second deactivation of the same code is not an error.
    uc.execute(&issued.code).await.unwrap();

    let result = uc.execute("9998").await;
    assert!(
        matches!(result, Err(RflctServiceError::CodeNotFound)),
        "expected CodeNotFound for unknown code, got {result:?}"
    );
}

#[tokio::test]
async fn should_generate_batch_of_distinct_codes() {
    let uc = GenerateBatchUseCase {
        repo: MemoryCodeRepo::new(),
    };
    let codes = uc.execute(50).await.unwrap();
    assert_eq!(codes.len(), 50);
    let distinct: HashSet<_> = codes.iter().collect();
    assert_eq!(distinct.len(), 50);

    let capped = uc.execute(BATCH_CAP + 1).await.unwrap();
    assert_eq!(capped.len(), BATCH_CAP as usize);
}

#[tokio::test]
async fn should_exhaust_batch_generation_in_a_tiny_code_space() {
    // Only two reservable codes exist; asking for five must exhaust the
    // retry budget once the space is used up.
    let uc = GenerateBatchUseCase {
        repo: MemoryCodeRepo::restricted(&["4110", "4111"]),
    };
    let result = uc.execute(5).await;
    assert!(
        matches!(result, Err(RflctServiceError::GenerationExhausted)),
        "expected GenerationExhausted, got {result:?}"
    );
}

#[tokio::test]
async fn should_list_newest_first_with_filters_and_pagination() {
    let repo = MemoryCodeRepo::new();
    let issue = IssueCodeUseCase { repo: repo.clone() };
    for _ in 0..3 {
        issue.execute(issue_input(CodeType::Promotion)).await.unwrap();
    }
    let last = issue.execute(issue_input(CodeType::UserAccess)).await.unwrap();
    DeactivateCodeUseCase { repo: repo.clone() }
        .execute(&last.code)
        .await
        .unwrap();

    let list = ListCodesUseCase { repo: repo.clone() };

    let all = list
        .execute(CodeFilter::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 4);
    assert_eq!(all[0].code, last.code, "newest code must come first");

    let promotions = list
        .execute(
            CodeFilter {
                code_type: Some(CodeType::Promotion),
                is_active: None,
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(promotions.len(), 3);

    let inactive = list
        .execute(
            CodeFilter {
                code_type: None,
                is_active: Some(false),
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(inactive.len(), 1);
    assert_eq!(inactive[0].code, last.code);

    let page = list
        .execute(
            CodeFilter::default(),
            PageRequest {
                per_page: 3,
                page: 2,
            },
        )
        .await
        .unwrap();
    assert_eq!(page.len(), 1, "second page holds the remaining record");
}

#[tokio::test]
async fn should_aggregate_analytics_across_the_registry() {
    let repo = MemoryCodeRepo::new();
    let issue = IssueCodeUseCase { repo: repo.clone() };
    let promo = issue.execute(issue_input(CodeType::Promotion)).await.unwrap();
    issue.execute(issue_input(CodeType::Promotion)).await.unwrap();
    let access = issue.execute(issue_input(CodeType::UserAccess)).await.unwrap();

    let redeem = RedeemCodeUseCase { repo: repo.clone() };
    redeem.execute(&promo.code, None).await.unwrap();
    redeem.execute(&promo.code, None).await.unwrap();
    redeem.execute(&access.code, None).await.unwrap();
    DeactivateCodeUseCase { repo: repo.clone() }
        .execute(&access.code)
        .await
        .unwrap();

    let analytics = CodeAnalyticsUseCase { repo: repo.clone() }
        .execute()
        .await
        .unwrap();
    assert_eq!(analytics.total_codes, 3);
    assert_eq!(analytics.active_codes, 2);
    assert_eq!(analytics.total_usage, 3);
    let promo_count = analytics
        .by_type
        .iter()
        .find(|t| t.code_type == CodeType::Promotion)
        .unwrap()
        .count;
    assert_eq!(promo_count, 2);

    // Both redeemed codes appear in the feed, most recent redemption first;
    // deactivation does not remove a code from it.
    assert_eq!(analytics.recent_activity.len(), 2);
    assert_eq!(analytics.recent_activity[0].code, access.code);
    assert_eq!(analytics.recent_activity[1].code, promo.code);
    assert_eq!(analytics.recent_activity[1].usage_count, 2);
}

#[tokio::test]
async fn should_cap_recent_activity_and_drop_the_oldest_redemptions() {
    let repo = MemoryCodeRepo::new();
    let issue = IssueCodeUseCase { repo: repo.clone() };
    let redeem = RedeemCodeUseCase { repo: repo.clone() };

    let mut codes = Vec::new();
    for _ in 0..12 {
        let issued = issue.execute(issue_input(CodeType::Promotion)).await.unwrap();
        redeem.execute(&issued.code, None).await.unwrap();
        codes.push(issued.code);
    }

    let analytics = CodeAnalyticsUseCase { repo }.execute().await.unwrap();
    assert_eq!(analytics.recent_activity.len(), RECENT_ACTIVITY_LIMIT);
    assert_eq!(analytics.recent_activity[0].code, codes[11]);
    assert!(
        analytics
            .recent_activity
            .iter()
            .all(|r| r.code != codes[0] && r.code != codes[1]),
        "the two oldest redemptions must fall off the feed"
    );
}
