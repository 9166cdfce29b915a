use storefront_admin_api::{
    domain::shipping::{
        DefaultShipping, Destination, QuoteSource, RegionType, ShippingError, ShippingRule, resolve,
    },
    dto::shipping::ShippingConfigRequest,
    error::AppError,
    services::shipping_service::rule_from_request,
};
use uuid::Uuid;

fn request(name: &str, region_type: RegionType, priority: i32) -> ShippingConfigRequest {
    ShippingConfigRequest {
        name: name.into(),
        region_type,
        state_code: None,
        cep_prefix: None,
        cep_range_start: None,
        cep_range_end: None,
        base_cost_cents: 1000,
        delivery_days: 5,
        weight_multiplier: 0.0,
        min_weight_kg: 0.0,
        active: true,
        priority,
    }
}

fn storefront_rules() -> Vec<ShippingRule> {
    let same_cep = ShippingConfigRequest {
        cep_prefix: Some("01310".into()),
        base_cost_cents: 0,
        delivery_days: 1,
        ..request("Retirada", RegionType::SameCep, 100)
    };
    let metro = ShippingConfigRequest {
        state_code: Some("sp".into()),
        cep_range_start: Some(1_000_000),
        cep_range_end: Some(9_999_999),
        base_cost_cents: 1500,
        delivery_days: 2,
        ..request("Grande SP", RegionType::MetroSp, 50)
    };
    let state = ShippingConfigRequest {
        state_code: Some("SP".into()),
        base_cost_cents: 2500,
        delivery_days: 4,
        ..request("Interior", RegionType::SpState, 20)
    };
    let rest = ShippingConfigRequest {
        base_cost_cents: 4000,
        delivery_days: 8,
        weight_multiplier: 0.5,
        min_weight_kg: 2.0,
        ..request("Brasil", RegionType::OtherStates, 0)
    };
    [same_cep, metro, state, rest]
        .iter()
        .map(|r| rule_from_request(Uuid::new_v4(), r).unwrap())
        .collect()
}

const DEFAULT: Option<DefaultShipping> = Some(DefaultShipping {
    cost_cents: 9900,
    delivery_days: 15,
});

fn quote_for(state: Option<&str>, cep: Option<&str>, weight: f64) -> (String, i64, i32) {
    let dest = Destination::parse(state, cep).unwrap();
    let quote = resolve(&storefront_rules(), DEFAULT, &dest, weight).unwrap();
    (quote.config_name.unwrap(), quote.cost_cents, quote.delivery_days)
}

#[test]
fn most_specific_rule_wins_by_priority() {
    assert_eq!(quote_for(Some("SP"), Some("01310-100"), 1.0), ("Retirada".into(), 0, 1));
    assert_eq!(quote_for(Some("SP"), Some("04001-000"), 1.0), ("Grande SP".into(), 1500, 2));
    assert_eq!(quote_for(Some("sp"), Some("13010-000"), 1.0), ("Interior".into(), 2500, 4));
    assert_eq!(quote_for(Some("SP"), None, 1.0), ("Interior".into(), 2500, 4));
}

#[test]
fn catch_all_applies_weight_surcharge() {
    // 4 kg, 2 kg free: 4000 + round(2 * 0.5 * 4000)
    assert_eq!(quote_for(Some("RJ"), Some("20040-002"), 4.0), ("Brasil".into(), 8000, 8));
    assert_eq!(quote_for(Some("RJ"), None, 1.0), ("Brasil".into(), 4000, 8));
}

#[test]
fn without_catch_all_the_default_applies() {
    let rules: Vec<ShippingRule> = storefront_rules()
        .into_iter()
        .filter(|r| r.region_type != RegionType::OtherStates)
        .collect();
    let dest = Destination::parse(Some("AM"), None).unwrap();
    let quote = resolve(&rules, DEFAULT, &dest, 3.0).unwrap();
    assert_eq!(quote.source, QuoteSource::Default);
    assert_eq!((quote.cost_cents, quote.delivery_days), (9900, 15));
    assert!(quote.config_id.is_none());

    assert_eq!(
        resolve(&rules, None, &dest, 3.0),
        Err(ShippingError::NotConfigured)
    );
}

#[test]
fn invalid_admin_input_is_a_bad_request() {
    let over = ShippingConfigRequest {
        weight_multiplier: 1.5,
        ..request("Caro", RegionType::OtherStates, 0)
    };
    assert!(matches!(
        rule_from_request(Uuid::new_v4(), &over),
        Err(AppError::BadRequest(_))
    ));

    let bad_state = ShippingConfigRequest {
        state_code: Some("São Paulo".into()),
        ..request("Estado", RegionType::SpState, 0)
    };
    assert!(matches!(
        rule_from_request(Uuid::new_v4(), &bad_state),
        Err(AppError::BadRequest(_))
    ));
}

#[test]
fn absurd_cart_weight_is_a_bad_request() {
    let dest = Destination::parse(Some("RJ"), None).unwrap();
    let err = resolve(&storefront_rules(), None, &dest, 1e300).unwrap_err();
    assert!(matches!(err, ShippingError::InvalidWeight(_)));
    assert!(matches!(AppError::from(err), AppError::BadRequest(_)));
}
