//! Redemption engine integration tests.

use std::sync::{Arc, Mutex};

use bulklink_core::db::Database;
use bulklink_core::links::{CreateLinkRequest, LinkIssuer};
use bulklink_core::models::{
    BulkPurchase, ClientAccount, PatientLink, ProductScheme, PurchaseStatus, RequestMeta,
};
use bulklink_core::redeem::{RedeemError, RedeemRequest, RedemptionEngine};
use bulklink_core::StorefrontConfig;

struct Fixture {
    db: Database,
    config: StorefrontConfig,
    client_id: String,
    purchase_id: String,
}

/// Seed a client, a scheme granting one unit per link, and a purchase.
fn setup(purchased: i64, remaining: i64) -> Fixture {
    let db = Database::open_in_memory().unwrap();

    let client = ClientAccount::new("clinic@example.com".into(), "Clinic".into());
    db.insert_client(&client).unwrap();

    let mut scheme = ProductScheme::new("SKU001".into(), "CGM Sensor".into(), 49.99);
    scheme.product_id = Some("prod-1".into());
    scheme.variant_id = Some("var-1".into());
    db.upsert_scheme(&scheme).unwrap();

    let mut purchase = BulkPurchase::new(
        client.id.clone(),
        "order-1001".into(),
        "SKU001".into(),
        "CGM Sensor".into(),
        purchased,
    );
    purchase.quantity_remaining = remaining;
    db.insert_purchase(&purchase).unwrap();

    let config = StorefrontConfig {
        store_url: Some("example.myshopify.com".into()),
        ..Default::default()
    };

    Fixture {
        db,
        config,
        client_id: client.id,
        purchase_id: purchase.id,
    }
}

fn issue_link(fixture: &Fixture, max_uses: i64) -> PatientLink {
    let issuer = LinkIssuer::new(&fixture.config);
    issuer
        .create_link(
            &fixture.db,
            &fixture.client_id,
            &CreateLinkRequest {
                bulk_purchase_id: fixture.purchase_id.clone(),
                patient_email: None,
                patient_name: None,
                notes: None,
                max_uses,
            },
        )
        .unwrap()
}

fn make_request() -> RedeemRequest {
    RedeemRequest {
        patient_email: "pat@example.com".into(),
        patient_name: "Pat Doe".into(),
        phone: None,
    }
}

#[test]
fn test_redeem_decrements_ledger_once() {
    let mut fixture = setup(100, 85);
    let link = issue_link(&fixture, 1);
    let engine = RedemptionEngine::new(&fixture.config);

    let outcome = engine
        .redeem(
            &mut fixture.db,
            &link.link_token,
            &make_request(),
            &RequestMeta {
                ip_address: Some("203.0.113.7".into()),
                user_agent: Some("test-agent".into()),
            },
        )
        .unwrap();

    assert_eq!(outcome.fulfillment.quantity_fulfilled, 1);
    assert_eq!(outcome.discount_code, link.discount_code);
    assert_eq!(
        outcome.checkout_url.as_deref(),
        Some(format!("https://example.myshopify.com/cart/var-1:1?discount={}", link.discount_code).as_str())
    );

    let purchase = fixture.db.purchase_by_id(&fixture.purchase_id).unwrap().unwrap();
    assert_eq!(purchase.quantity_remaining, 84);
    assert_eq!(purchase.status, PurchaseStatus::Active);

    let stored = fixture.db.link_by_token(&link.link_token).unwrap().unwrap();
    assert_eq!(stored.current_uses, 1);
    assert_eq!(stored.patient_email.as_deref(), Some("pat@example.com"));

    let fulfillments = fixture.db.list_fulfillments_for_link(&link.id).unwrap();
    assert_eq!(fulfillments.len(), 1);
    assert_eq!(fulfillments[0].ip_address.as_deref(), Some("203.0.113.7"));
}

#[test]
fn test_second_attempt_is_gone() {
    let mut fixture = setup(100, 85);
    let link = issue_link(&fixture, 1);
    let engine = RedemptionEngine::new(&fixture.config);

    engine
        .redeem(&mut fixture.db, &link.link_token, &make_request(), &RequestMeta::default())
        .unwrap();

    let second = engine.redeem(
        &mut fixture.db,
        &link.link_token,
        &make_request(),
        &RequestMeta::default(),
    );
    match second {
        Err(RedeemError::Gone(reasons)) => assert!(reasons.fully_used),
        other => panic!("expected Gone, got {:?}", other.map(|_| ())),
    }

    // No double decrement, no second fulfillment
    let purchase = fixture.db.purchase_by_id(&fixture.purchase_id).unwrap().unwrap();
    assert_eq!(purchase.quantity_remaining, 84);
    assert_eq!(fixture.db.list_fulfillments_for_link(&link.id).unwrap().len(), 1);
}

#[test]
fn test_unknown_token() {
    let mut fixture = setup(10, 10);
    let engine = RedemptionEngine::new(&fixture.config);

    let result = engine.redeem(
        &mut fixture.db,
        "0000000000000000000000000000000000000000000000000000000000000000",
        &make_request(),
        &RequestMeta::default(),
    );
    assert!(matches!(result, Err(RedeemError::UnknownToken)));
}

#[test]
fn test_blank_fields_rejected_before_any_write() {
    let mut fixture = setup(10, 10);
    let link = issue_link(&fixture, 1);
    let engine = RedemptionEngine::new(&fixture.config);

    let request = RedeemRequest {
        patient_email: "   ".into(),
        patient_name: "Pat Doe".into(),
        phone: None,
    };
    let result = engine.redeem(&mut fixture.db, &link.link_token, &request, &RequestMeta::default());
    assert!(matches!(result, Err(RedeemError::Validation(_))));

    let stored = fixture.db.link_by_token(&link.link_token).unwrap().unwrap();
    assert_eq!(stored.current_uses, 0);
}

#[test]
fn test_expired_link_is_gone() {
    let mut fixture = setup(10, 10);
    let link = issue_link(&fixture, 1);

    fixture
        .db
        .conn()
        .execute(
            "UPDATE patient_links SET expires_at = '2020-01-01T00:00:00+00:00' WHERE id = ?",
            [link.id.as_str()],
        )
        .unwrap();

    let engine = RedemptionEngine::new(&fixture.config);
    let result = engine.redeem(
        &mut fixture.db,
        &link.link_token,
        &make_request(),
        &RequestMeta::default(),
    );
    match result {
        Err(RedeemError::Gone(reasons)) => {
            assert!(reasons.expired);
            assert!(!reasons.fully_used);
        }
        other => panic!("expected Gone, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_exhaustion_completes_purchase_and_starves_siblings() {
    let mut fixture = setup(5, 1);
    let winner = issue_link(&fixture, 1);
    let loser = issue_link(&fixture, 1);
    let engine = RedemptionEngine::new(&fixture.config);

    engine
        .redeem(&mut fixture.db, &winner.link_token, &make_request(), &RequestMeta::default())
        .unwrap();

    let purchase = fixture.db.purchase_by_id(&fixture.purchase_id).unwrap().unwrap();
    assert_eq!(purchase.quantity_remaining, 0);
    assert_eq!(purchase.status, PurchaseStatus::Completed);

    // The sibling link was issued validly but is now unredeemable
    let result = engine.redeem(
        &mut fixture.db,
        &loser.link_token,
        &make_request(),
        &RequestMeta::default(),
    );
    match result {
        Err(RedeemError::Gone(reasons)) => assert!(reasons.no_bulk_inventory),
        other => panic!("expected Gone, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_multi_use_link_consumes_budget_then_stops() {
    let mut fixture = setup(10, 10);
    let link = issue_link(&fixture, 3);
    let engine = RedemptionEngine::new(&fixture.config);

    for _ in 0..3 {
        engine
            .redeem(&mut fixture.db, &link.link_token, &make_request(), &RequestMeta::default())
            .unwrap();
    }
    let fourth = engine.redeem(
        &mut fixture.db,
        &link.link_token,
        &make_request(),
        &RequestMeta::default(),
    );
    assert!(matches!(fourth, Err(RedeemError::Gone(_))));

    let purchase = fixture.db.purchase_by_id(&fixture.purchase_id).unwrap().unwrap();
    assert_eq!(purchase.quantity_remaining, 7);

    let stored = fixture.db.link_by_token(&link.link_token).unwrap().unwrap();
    assert_eq!(stored.current_uses, 3);
}

#[test]
fn test_multi_unit_scheme_decrements_by_allocation() {
    let mut fixture = setup(10, 10);

    fixture
        .db
        .conn()
        .execute(
            "UPDATE product_schemes SET max_units_per_link = 4 WHERE sku = 'SKU001'",
            [],
        )
        .unwrap();

    let link = issue_link(&fixture, 1);
    let engine = RedemptionEngine::new(&fixture.config);

    let outcome = engine
        .redeem(&mut fixture.db, &link.link_token, &make_request(), &RequestMeta::default())
        .unwrap();
    assert_eq!(outcome.fulfillment.quantity_fulfilled, 4);

    let purchase = fixture.db.purchase_by_id(&fixture.purchase_id).unwrap().unwrap();
    assert_eq!(purchase.quantity_remaining, 6);
}

#[test]
fn test_at_most_once_under_concurrent_attempts() {
    let fixture = setup(100, 85);
    let link = issue_link(&fixture, 1);

    let db = Arc::new(Mutex::new(fixture.db));
    let config = fixture.config.clone();
    let token = link.link_token.clone();

    let mut handles = Vec::new();
    for i in 0..8 {
        let db = Arc::clone(&db);
        let config = config.clone();
        let token = token.clone();
        handles.push(std::thread::spawn(move || {
            let engine = RedemptionEngine::new(&config);
            let request = RedeemRequest {
                patient_email: format!("pat{}@example.com", i),
                patient_name: "Pat Doe".into(),
                phone: None,
            };
            let mut db = db.lock().unwrap();
            engine.redeem(&mut db, &token, &request, &RequestMeta::default())
        }));
    }

    let mut successes = 0;
    let mut gone = 0;
    for handle in handles {
        match handle.join().unwrap() {
            Ok(_) => successes += 1,
            Err(RedeemError::Gone(_)) => gone += 1,
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(gone, 7);

    let db = db.lock().unwrap();
    let purchase = db.purchase_by_id(&fixture.purchase_id).unwrap().unwrap();
    // Exactly one scheme unit left the ledger, not one per attempt
    assert_eq!(purchase.quantity_remaining, 84);
    assert_eq!(db.list_fulfillments_for_link(&link.id).unwrap().len(), 1);
}

mod ledger_properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// The remaining balance stays within [0, purchased] under any
        /// sequence of redemption attempts, and every success is backed by
        /// exactly one fulfillment.
        #[test]
        fn prop_ledger_bounds_hold(purchased in 1i64..30, attempts in 1usize..60) {
            let mut fixture = setup(purchased, purchased);
            let link = issue_link(&fixture, 100);
            let engine = RedemptionEngine::new(&fixture.config);

            let mut successes = 0i64;
            for _ in 0..attempts {
                if engine
                    .redeem(&mut fixture.db, &link.link_token, &make_request(), &RequestMeta::default())
                    .is_ok()
                {
                    successes += 1;
                }
            }

            let purchase = fixture.db.purchase_by_id(&fixture.purchase_id).unwrap().unwrap();
            prop_assert!(purchase.quantity_remaining >= 0);
            prop_assert!(purchase.quantity_remaining <= purchase.quantity_purchased);
            prop_assert_eq!(purchase.quantity_remaining, purchased - successes);
            prop_assert_eq!(successes, purchased.min(attempts as i64));

            let stored = fixture.db.link_by_token(&link.link_token).unwrap().unwrap();
            prop_assert!(stored.current_uses <= stored.max_uses);
            prop_assert_eq!(stored.current_uses, successes);

            let fulfillments = fixture.db.list_fulfillments_for_link(&link.id).unwrap();
            prop_assert_eq!(fulfillments.len() as i64, successes);

            if purchase.quantity_remaining == 0 {
                prop_assert_eq!(purchase.status, PurchaseStatus::Completed);
            }
        }
    }
}
