use olosuashi_shared::{Amount, Pricing};
use serde::Serialize;

/// Price as shown on cards and detail pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceTag {
    /// What the traveler pays per person.
    pub amount: Amount,

    /// Struck-through base price, present only when a discount applies.
    pub was: Option<Amount>,

    /// Whole-percent saving, rounded down.
    pub discount_percent: Option<u8>,

    pub currency: String,
}

impl PriceTag {
    pub fn from_pricing(pricing: &Pricing) -> Self {
        match pricing.discount_price {
            // A "discount" at or above base is ignored
            Some(discount) if discount < pricing.base_price => {
                let saved = pricing.base_price - discount;
                // saved < base, so the ratio is below 100 and fits a u8
                let percent = (u128::from(saved) * 100 / u128::from(pricing.base_price)) as u8;
                Self {
                    amount: discount,
                    was: Some(pricing.base_price),
                    discount_percent: Some(percent),
                    currency: pricing.currency.clone(),
                }
            }
            _ => Self {
                amount: pricing.base_price,
                was: None,
                discount_percent: None,
                currency: pricing.currency.clone(),
            },
        }
    }

    /// Total for a party of `travelers`.
    pub fn for_party(&self, travelers: u32) -> Amount {
        self.amount.saturating_mul(Amount::from(travelers))
    }
}
