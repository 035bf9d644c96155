//! Request to feature vector encoding. Column order and constants are fixed by
//! the training pipeline of the paired artifacts and must not drift.

use crate::base::FeatureVector;
use crate::types::{
    AddOnService, ChurnRequest, ContractType, CreditCardRequest, InternetService, PaymentMethod,
    YesNo,
};

pub const CHURN_FEATURES: usize = 21;
pub const CREDIT_FEATURES: usize = 7;

/// Min-max scaler parameters as exported by the training pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinMax {
    pub scale: f64,
    pub min: f64,
}

impl MinMax {
    pub fn apply(&self, value: f64) -> f64 {
        value * self.scale + self.min
    }
}

pub const SENIOR_SCALER: MinMax = MinMax {
    scale: 1.0,
    min: 0.0,
};
pub const TENURE_SCALER: MinMax = MinMax {
    scale: 0.01388889,
    min: 0.0,
};
pub const CHARGE_SCALER: MinMax = MinMax {
    scale: 0.01001502,
    min: -0.18828242,
};

fn flag(on: bool) -> f64 {
    if on {
        1.0
    } else {
        0.0
    }
}

/// Drop-first dummies for a {No, No internet service, Yes} answer.
fn add_on_dummies(value: AddOnService) -> [f64; 2] {
    [
        flag(value == AddOnService::NoInternetService),
        flag(value == AddOnService::Yes),
    ]
}

/// Encodes a churn request into the 21 columns both churn artifacts expect.
pub fn encode_churn(request: &ChurnRequest) -> FeatureVector {
    let mut features = Vec::with_capacity(CHURN_FEATURES);

    features.push(SENIOR_SCALER.apply(request.senior_citizen));
    features.push(TENURE_SCALER.apply(request.tenure_months));
    features.push(CHARGE_SCALER.apply(request.monthly_charge));

    features.push(flag(request.partner == YesNo::Yes));
    features.push(flag(request.dependents == YesNo::Yes));

    // DSL is the reference category
    features.push(flag(request.internet == InternetService::FiberOptic));
    features.push(flag(request.internet == InternetService::No));

    for add_on in request.add_ons() {
        features.extend(add_on_dummies(add_on));
    }

    features.push(flag(request.contract == ContractType::OneYear));
    features.push(flag(request.contract == ContractType::TwoYear));

    features.push(flag(request.paperless_billing == YesNo::Yes));

    // bank transfer is the reference category
    features.push(flag(request.payment_method == PaymentMethod::CreditCard));
    features.push(flag(request.payment_method == PaymentMethod::ElectronicCheck));
    features.push(flag(request.payment_method == PaymentMethod::MailedCheck));

    FeatureVector::new(features)
}

/// Encodes a credit request into the 7 raw columns of the segmentation
/// artifact. The clustering pipeline scales internally, so values pass
/// through untouched.
pub fn encode_credit(request: &CreditCardRequest) -> FeatureVector {
    FeatureVector::new(vec![
        request.balance,
        request.purchases_frequency,
        request.cash_advance,
        request.payments,
        request.minimum_payments,
        request.prc_full_payment,
        request.credit_limit,
    ])
}
