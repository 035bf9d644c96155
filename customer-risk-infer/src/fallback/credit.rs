use crate::segments::RiskLevel;
use crate::types::CreditCardRequest;

/// Zero (or NaN) denominators count as 1.
fn denominator(value: f64) -> f64 {
    if value == 0.0 || value.is_nan() {
        1.0
    } else {
        value
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CreditRatios {
    pub balance: f64,
    pub payment: f64,
    pub cash_advance: f64,
}

impl CreditRatios {
    pub fn from_request(request: &CreditCardRequest) -> Self {
        CreditRatios {
            balance: request.balance / denominator(request.credit_limit),
            payment: request.payments / denominator(request.balance),
            cash_advance: request.cash_advance / denominator(request.balance),
        }
    }
}

/// Behavioural segments the rule engine can assign, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentRule {
    Premium,
    StableRevolver,
    CashAdvanceDependent,
    HighRisk,
    Inactive,
}

impl SegmentRule {
    pub const ALL: [SegmentRule; 5] = [
        SegmentRule::Premium,
        SegmentRule::StableRevolver,
        SegmentRule::CashAdvanceDependent,
        SegmentRule::HighRisk,
        SegmentRule::Inactive,
    ];

    /// First matching rule wins; accounts matching none are treated as
    /// stable revolvers.
    pub fn classify(request: &CreditCardRequest) -> Self {
        let ratios = CreditRatios::from_request(request);
        let frequency = request.purchases_frequency;
        let full_payment = request.prc_full_payment;

        if ratios.balance < 0.3 && frequency > 0.6 && full_payment > 0.5 && ratios.cash_advance < 0.1
        {
            SegmentRule::Premium
        } else if ratios.balance < 0.7
            && ratios.payment > 0.5
            && frequency > 0.3
            && ratios.cash_advance < 0.3
        {
            SegmentRule::StableRevolver
        } else if ratios.cash_advance > 0.4
            || (ratios.balance > 0.6 && request.cash_advance > request.balance * 0.3)
        {
            SegmentRule::CashAdvanceDependent
        } else if ratios.balance > 0.7
            && ratios.payment < 0.3
            && full_payment < 0.2
            && frequency < 0.3
        {
            SegmentRule::HighRisk
        } else if frequency < 0.2 && ratios.balance < 0.2 {
            SegmentRule::Inactive
        } else {
            SegmentRule::StableRevolver
        }
    }

    pub fn cluster(&self) -> i64 {
        match self {
            SegmentRule::Premium => 0,
            SegmentRule::StableRevolver => 1,
            SegmentRule::CashAdvanceDependent => 2,
            SegmentRule::HighRisk => 3,
            SegmentRule::Inactive => 4,
        }
    }

    pub fn risk(&self) -> RiskLevel {
        match self {
            SegmentRule::Premium | SegmentRule::Inactive => RiskLevel::Low,
            SegmentRule::StableRevolver => RiskLevel::Medium,
            SegmentRule::CashAdvanceDependent | SegmentRule::HighRisk => RiskLevel::High,
        }
    }
}
