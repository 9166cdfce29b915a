//! Regional shipping rules and cost resolution.
//!
//! Rules are evaluated as an ordered list: active rules sorted by priority
//! (highest first) and then by name, and the first rule that matches the
//! destination wins. When nothing matches, the store-wide default applies.

use std::cmp::Ordering;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum RegionType {
    #[sea_orm(string_value = "same_cep")]
    SameCep,
    #[sea_orm(string_value = "metro_sp")]
    MetroSp,
    #[sea_orm(string_value = "sp_state")]
    SpState,
    #[sea_orm(string_value = "other_states")]
    OtherStates,
    #[sea_orm(string_value = "custom")]
    Custom,
}

impl RegionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegionType::SameCep => "same_cep",
            RegionType::MetroSp => "metro_sp",
            RegionType::SpState => "sp_state",
            RegionType::OtherStates => "other_states",
            RegionType::Custom => "custom",
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ShippingError {
    #[error("destination requires a state code or a CEP")]
    MissingDestination,
    #[error("invalid state code '{0}'")]
    InvalidState(String),
    #[error("invalid CEP '{0}'")]
    InvalidCep(String),
    #[error("invalid weight {0}")]
    InvalidWeight(f64),
    #[error("invalid shipping rule: {0}")]
    InvalidRule(String),
    #[error("shipping cost out of range")]
    CostOutOfRange,
    #[error("no shipping rule matched and no default shipping settings exist")]
    NotConfigured,
}

/// Heaviest cart a quote is computed for.
pub const MAX_WEIGHT_KG: f64 = 10_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ShippingRule {
    pub id: Uuid,
    pub name: String,
    pub region_type: RegionType,
    pub state_code: Option<String>,
    pub cep_prefix: Option<String>,
    pub cep_range_start: Option<i32>,
    pub cep_range_end: Option<i32>,
    pub base_cost_cents: i64,
    pub delivery_days: i32,
    pub weight_multiplier: f64,
    pub min_weight_kg: f64,
    pub active: bool,
    pub priority: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultShipping {
    pub cost_cents: i64,
    pub delivery_days: i32,
}

/// A validated destination: upper-case state and/or an 8-digit CEP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub state: Option<String>,
    pub cep: Option<String>,
}

impl Destination {
    pub fn parse(state: Option<&str>, cep: Option<&str>) -> Result<Self, ShippingError> {
        let state = state
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(normalize_state)
            .transpose()?;
        let cep = cep
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(normalize_cep)
            .transpose()?;
        if state.is_none() && cep.is_none() {
            return Err(ShippingError::MissingDestination);
        }
        Ok(Self { state, cep })
    }

    fn cep_number(&self) -> Option<i32> {
        self.cep.as_deref().and_then(|c| c.parse().ok())
    }
}

pub fn normalize_state(raw: &str) -> Result<String, ShippingError> {
    let trimmed = raw.trim();
    if trimmed.len() == 2 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(trimmed.to_ascii_uppercase())
    } else {
        Err(ShippingError::InvalidState(raw.to_string()))
    }
}

pub fn normalize_cep(raw: &str) -> Result<String, ShippingError> {
    let trimmed = raw.trim();
    if trimmed.matches('-').count() > 1 {
        return Err(ShippingError::InvalidCep(raw.to_string()));
    }
    let digits: String = trimmed.chars().filter(|c| *c != '-').collect();
    if digits.len() == 8 && digits.chars().all(|c| c.is_ascii_digit()) {
        Ok(digits)
    } else {
        Err(ShippingError::InvalidCep(raw.to_string()))
    }
}

impl ShippingRule {
    /// Field checks applied when an admin creates or edits a rule.
    pub fn validate(&self) -> Result<(), ShippingError> {
        let invalid = |msg: &str| Err(ShippingError::InvalidRule(msg.to_string()));
        if self.name.trim().is_empty() {
            return invalid("name must not be empty");
        }
        if self.base_cost_cents < 0 {
            return invalid("base_cost_cents must not be negative");
        }
        if self.delivery_days < 0 {
            return invalid("delivery_days must not be negative");
        }
        if !(0.0..=1.0).contains(&self.weight_multiplier) {
            return invalid("weight_multiplier must be within [0, 1]");
        }
        if !self.min_weight_kg.is_finite() || self.min_weight_kg < 0.0 {
            return invalid("min_weight_kg must not be negative");
        }
        if let Some(state) = &self.state_code {
            normalize_state(state)?;
        }
        if let Some(prefix) = &self.cep_prefix {
            if prefix.is_empty() || prefix.len() > 8 || !prefix.chars().all(|c| c.is_ascii_digit()) {
                return invalid("cep_prefix must be 1 to 8 digits");
            }
        }
        match (self.cep_range_start, self.cep_range_end) {
            (Some(start), Some(end)) => {
                if start < 0 || end > 99_999_999 || start > end {
                    return invalid("cep range must satisfy 0 <= start <= end <= 99999999");
                }
            }
            (None, None) => {}
            _ => return invalid("cep range needs both start and end"),
        }
        match self.region_type {
            RegionType::SameCep if self.cep_prefix.is_none() => invalid("same_cep requires cep_prefix"),
            RegionType::MetroSp if self.state_code.is_none() || self.cep_range_start.is_none() => {
                invalid("metro_sp requires state_code and a cep range")
            }
            RegionType::SpState if self.state_code.is_none() => invalid("sp_state requires state_code"),
            RegionType::Custom
                if self.state_code.is_none()
                    && self.cep_prefix.is_none()
                    && self.cep_range_start.is_none() =>
            {
                invalid("custom requires at least one matching field")
            }
            _ => Ok(()),
        }
    }

    pub fn matches(&self, dest: &Destination) -> bool {
        match self.region_type {
            RegionType::SameCep => self.prefix_matches(dest) == Some(true),
            RegionType::MetroSp => {
                self.state_matches(dest) == Some(true) && self.range_matches(dest) == Some(true)
            }
            RegionType::SpState => self.state_matches(dest) == Some(true),
            RegionType::OtherStates => true,
            RegionType::Custom => {
                let checks = [
                    self.state_matches(dest),
                    self.prefix_matches(dest),
                    self.range_matches(dest),
                ];
                checks.iter().any(Option::is_some) && checks.iter().flatten().all(|ok| *ok)
            }
        }
    }

    /// Base cost plus the proportional surcharge for weight above the free threshold.
    pub fn cost_for(&self, weight_kg: f64) -> Result<i64, ShippingError> {
        let excess = (weight_kg - self.min_weight_kg).max(0.0);
        let surcharge = (excess * self.weight_multiplier * self.base_cost_cents as f64).round();
        // `as` saturates, so anything at or past i64::MAX is rejected before the cast.
        if !surcharge.is_finite() || surcharge >= i64::MAX as f64 {
            return Err(ShippingError::CostOutOfRange);
        }
        self.base_cost_cents
            .checked_add(surcharge as i64)
            .ok_or(ShippingError::CostOutOfRange)
    }

    // `None` means the rule does not constrain on that field.
    fn state_matches(&self, dest: &Destination) -> Option<bool> {
        let code = self.state_code.as_deref()?;
        Some(
            dest.state
                .as_deref()
                .is_some_and(|state| state.eq_ignore_ascii_case(code)),
        )
    }

    fn prefix_matches(&self, dest: &Destination) -> Option<bool> {
        let prefix = self.cep_prefix.as_deref()?;
        Some(dest.cep.as_deref().is_some_and(|cep| cep.starts_with(prefix)))
    }

    fn range_matches(&self, dest: &Destination) -> Option<bool> {
        let (start, end) = (self.cep_range_start?, self.cep_range_end?);
        Some(
            dest.cep_number()
                .is_some_and(|cep| (start..=end).contains(&cep)),
        )
    }
}

/// Priority descending, then name ascending.
pub fn rule_order(a: &ShippingRule, b: &ShippingRule) -> Ordering {
    b.priority.cmp(&a.priority).then_with(|| a.name.cmp(&b.name))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum QuoteSource {
    Config,
    Default,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ShippingQuote {
    pub config_id: Option<Uuid>,
    pub config_name: Option<String>,
    pub region_type: Option<RegionType>,
    pub cost_cents: i64,
    pub delivery_days: i32,
    pub source: QuoteSource,
}

pub fn resolve(
    rules: &[ShippingRule],
    default: Option<DefaultShipping>,
    dest: &Destination,
    weight_kg: f64,
) -> Result<ShippingQuote, ShippingError> {
    if !(0.0..=MAX_WEIGHT_KG).contains(&weight_kg) {
        return Err(ShippingError::InvalidWeight(weight_kg));
    }

    let mut candidates: Vec<&ShippingRule> = rules.iter().filter(|r| r.active).collect();
    candidates.sort_by(|a, b| rule_order(a, b));

    if let Some(rule) = candidates.into_iter().find(|r| r.matches(dest)) {
        return Ok(ShippingQuote {
            config_id: Some(rule.id),
            config_name: Some(rule.name.clone()),
            region_type: Some(rule.region_type),
            cost_cents: rule.cost_for(weight_kg)?,
            delivery_days: rule.delivery_days,
            source: QuoteSource::Config,
        });
    }

    let default = default.ok_or(ShippingError::NotConfigured)?;
    Ok(ShippingQuote {
        config_id: None,
        config_name: None,
        region_type: None,
        cost_cents: default.cost_cents,
        delivery_days: default.delivery_days,
        source: QuoteSource::Default,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str, region_type: RegionType, priority: i32, base: i64) -> ShippingRule {
        ShippingRule {
            id: Uuid::new_v4(),
            name: name.to_string(),
            region_type,
            state_code: None,
            cep_prefix: None,
            cep_range_start: None,
            cep_range_end: None,
            base_cost_cents: base,
            delivery_days: 5,
            weight_multiplier: 0.1,
            min_weight_kg: 1.0,
            active: true,
            priority,
        }
    }

    fn sp_state() -> ShippingRule {
        ShippingRule {
            state_code: Some("SP".into()),
            ..rule("Estado de SP", RegionType::SpState, 1, 1000)
        }
    }

    const DEFAULT: DefaultShipping = DefaultShipping {
        cost_cents: 3000,
        delivery_days: 12,
    };

    #[test]
    fn higher_priority_state_rule_beats_catch_all() {
        let rules = vec![rule("Demais estados", RegionType::OtherStates, 0, 2000), sp_state()];
        let dest = Destination::parse(Some("sp"), None).unwrap();
        let quote = resolve(&rules, Some(DEFAULT), &dest, 0.5).unwrap();
        assert_eq!(quote.region_type, Some(RegionType::SpState));
        assert_eq!(quote.cost_cents, 1000);
        assert_eq!(quote.source, QuoteSource::Config);
    }

    #[test]
    fn other_states_catches_unmatched_state() {
        let rules = vec![rule("Demais estados", RegionType::OtherStates, 0, 2000), sp_state()];
        let dest = Destination::parse(Some("RJ"), Some("20040-020")).unwrap();
        let quote = resolve(&rules, Some(DEFAULT), &dest, 0.5).unwrap();
        assert_eq!(quote.config_name.as_deref(), Some("Demais estados"));
        assert_eq!(quote.cost_cents, 2000);
    }

    #[test]
    fn priority_tie_broken_by_name() {
        let rules = vec![
            rule("b-zone", RegionType::OtherStates, 3, 700),
            rule("a-zone", RegionType::OtherStates, 3, 900),
        ];
        let dest = Destination::parse(Some("MG"), None).unwrap();
        let quote = resolve(&rules, None, &dest, 0.0).unwrap();
        assert_eq!(quote.config_name.as_deref(), Some("a-zone"));
    }

    #[test]
    fn inactive_rules_are_skipped() {
        let mut inactive = sp_state();
        inactive.active = false;
        let dest = Destination::parse(Some("SP"), None).unwrap();
        let quote = resolve(&[inactive], Some(DEFAULT), &dest, 1.0).unwrap();
        assert_eq!(quote.source, QuoteSource::Default);
        assert_eq!(quote.cost_cents, 3000);
        assert_eq!(quote.delivery_days, 12);
    }

    #[test]
    fn missing_default_is_a_configuration_error() {
        let dest = Destination::parse(Some("BA"), None).unwrap();
        assert_eq!(
            resolve(&[sp_state()], None, &dest, 1.0),
            Err(ShippingError::NotConfigured)
        );
    }

    #[test]
    fn same_cep_matches_prefix() {
        let same = ShippingRule {
            cep_prefix: Some("01310".into()),
            ..rule("Mesmo CEP", RegionType::SameCep, 10, 500)
        };
        assert!(same.matches(&Destination::parse(None, Some("01310-100")).unwrap()));
        assert!(!same.matches(&Destination::parse(None, Some("01410-100")).unwrap()));
        assert!(!same.matches(&Destination::parse(Some("SP"), None).unwrap()));
    }

    #[test]
    fn metro_requires_state_and_range() {
        let metro = ShippingRule {
            state_code: Some("SP".into()),
            cep_range_start: Some(1_000_000),
            cep_range_end: Some(9_999_999),
            ..rule("Grande SP", RegionType::MetroSp, 5, 800)
        };
        assert!(metro.matches(&Destination::parse(Some("SP"), Some("04538-132")).unwrap()));
        assert!(!metro.matches(&Destination::parse(Some("SP"), Some("13010-000")).unwrap()));
        assert!(!metro.matches(&Destination::parse(Some("SP"), None).unwrap()));

        let no_range = ShippingRule {
            cep_range_start: None,
            cep_range_end: None,
            ..metro
        };
        assert!(!no_range.matches(&Destination::parse(Some("SP"), Some("04538-132")).unwrap()));
    }

    #[test]
    fn custom_requires_all_configured_fields() {
        let custom = ShippingRule {
            state_code: Some("PR".into()),
            cep_prefix: Some("80".into()),
            ..rule("Curitiba", RegionType::Custom, 4, 900)
        };
        assert!(custom.matches(&Destination::parse(Some("PR"), Some("80010-000")).unwrap()));
        assert!(!custom.matches(&Destination::parse(Some("PR"), Some("86010-000")).unwrap()));

        let empty = rule("vazio", RegionType::Custom, 4, 900);
        assert!(!empty.matches(&Destination::parse(Some("PR"), None).unwrap()));
    }

    #[test]
    fn cost_is_monotone_in_weight() {
        let r = sp_state();
        assert_eq!(r.cost_for(0.2), Ok(1000));
        assert_eq!(r.cost_for(1.0), Ok(1000));
        assert_eq!(r.cost_for(5.0), Ok(1400));
        let mut last = 0;
        for tenth in 0..100 {
            let cost = r.cost_for(tenth as f64 / 10.0).unwrap();
            assert!(cost >= last);
            last = cost;
        }
    }

    #[test]
    fn malformed_destination_rejected() {
        assert_eq!(
            Destination::parse(None, None),
            Err(ShippingError::MissingDestination)
        );
        assert!(matches!(
            Destination::parse(Some("SPX"), None),
            Err(ShippingError::InvalidState(_))
        ));
        assert_eq!(
            Destination::parse(None, Some("01310-100")).unwrap().cep.as_deref(),
            Some("01310100")
        );
        assert!(matches!(
            Destination::parse(None, Some("1234")),
            Err(ShippingError::InvalidCep(_))
        ));
        assert!(matches!(
            Destination::parse(None, Some("01-310-100")),
            Err(ShippingError::InvalidCep(_))
        ));
    }

    #[test]
    fn negative_weight_rejected() {
        let dest = Destination::parse(Some("SP"), None).unwrap();
        assert!(matches!(
            resolve(&[sp_state()], Some(DEFAULT), &dest, -1.0),
            Err(ShippingError::InvalidWeight(_))
        ));
    }

    #[test]
    fn huge_weight_rejected_instead_of_overflowing() {
        let mut heavy = sp_state();
        heavy.weight_multiplier = 0.5;
        let dest = Destination::parse(Some("SP"), None).unwrap();
        assert!(matches!(
            resolve(&[heavy.clone()], Some(DEFAULT), &dest, 1e300),
            Err(ShippingError::InvalidWeight(_))
        ));
        assert_eq!(heavy.cost_for(1e300), Err(ShippingError::CostOutOfRange));

        heavy.base_cost_cents = i64::MAX - 1;
        assert_eq!(heavy.cost_for(5.0), Err(ShippingError::CostOutOfRange));

        let quote = resolve(&[sp_state()], Some(DEFAULT), &dest, MAX_WEIGHT_KG).unwrap();
        assert!(quote.cost_cents > 0);
    }

    #[test]
    fn rule_validation() {
        assert!(sp_state().validate().is_ok());
        let mut bad = sp_state();
        bad.weight_multiplier = 1.5;
        assert!(bad.validate().is_err());
        let mut no_state = sp_state();
        no_state.state_code = None;
        assert!(no_state.validate().is_err());
        let mut half_range = sp_state();
        half_range.cep_range_start = Some(1);
        assert!(half_range.validate().is_err());
    }
}
