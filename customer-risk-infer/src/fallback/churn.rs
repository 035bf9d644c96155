use crate::types::{AddOnService, ChurnRequest, ContractType, InternetService, PaymentMethod, YesNo};

pub const MIN_CHURN_PROBABILITY: f64 = 0.01;
pub const MAX_CHURN_PROBABILITY: f64 = 0.99;
pub const CHURN_THRESHOLD: f64 = 0.5;

/// Binary decision derived from a churn-class probability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChurnVerdict {
    pub prediction: u8,
    /// Probability of the predicted class, not of churn.
    pub class_probability: f64,
}

impl ChurnVerdict {
    pub fn from_churn_probability(churn_probability: f64) -> Self {
        let churn = churn_probability.clamp(MIN_CHURN_PROBABILITY, MAX_CHURN_PROBABILITY);
        if churn >= CHURN_THRESHOLD {
            ChurnVerdict {
                prediction: 1,
                class_probability: churn,
            }
        } else {
            ChurnVerdict {
                prediction: 0,
                class_probability: 1.0 - churn,
            }
        }
    }
}

/// Additive risk score approximating the nearest-neighbour model.
pub fn knn_churn_score(request: &ChurnRequest) -> f64 {
    let mut score = 0.0;

    score += match request.contract {
        ContractType::MonthToMonth => 0.3,
        ContractType::OneYear => 0.1,
        ContractType::TwoYear => 0.05,
    };

    if request.internet == InternetService::FiberOptic {
        score += 0.15;
    }

    if request.payment_method == PaymentMethod::ElectronicCheck {
        score += 0.2;
    }

    let missing_add_ons = request.add_ons().len() - request.subscribed_add_ons();
    score += missing_add_ons as f64 * 0.1;

    if request.tenure_months < 12.0 {
        score += 0.2;
    } else if request.tenure_months < 24.0 {
        score += 0.1;
    }

    if request.monthly_charge > 100.0 {
        score += 0.15;
    } else if request.monthly_charge < 30.0 {
        score += 0.1;
    }

    if request.paperless_billing == YesNo::No {
        score += 0.1;
    }

    score
}

/// Hand-set log-odds approximating the logistic regression model, passed
/// through the logistic function.
pub fn logreg_churn_probability(request: &ChurnRequest) -> f64 {
    let mut logit = -2.5;

    logit += -0.02 * request.tenure_months;
    logit += 0.01 * request.monthly_charge;
    logit += 0.3 * request.senior_citizen;

    logit += match request.contract {
        ContractType::MonthToMonth => 1.2,
        ContractType::OneYear => 0.3,
        ContractType::TwoYear => -0.5,
    };

    logit += match request.payment_method {
        PaymentMethod::ElectronicCheck => 0.8,
        PaymentMethod::MailedCheck => 0.4,
        PaymentMethod::BankTransfer | PaymentMethod::CreditCard => -0.2,
    };

    logit += match request.internet {
        InternetService::FiberOptic => 0.4,
        InternetService::Dsl => 0.1,
        InternetService::No => -0.3,
    };

    let add_on_weights = [-0.2, -0.15, -0.15, -0.25];
    for (service, weight) in request.add_ons().iter().zip(add_on_weights) {
        if *service == AddOnService::Yes {
            logit += weight;
        }
    }

    if request.paperless_billing == YesNo::No {
        logit += 0.3;
    }
    if request.partner == YesNo::No {
        logit += 0.1;
    }
    if request.dependents == YesNo::Yes {
        logit -= 0.1;
    }

    1.0 / (1.0 + (-logit).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::churn::fixtures::*;

    #[test]
    fn knn_scenario_month_to_month_fiber_echeck() {
        let request = high_risk_churn_request();
        let score = knn_churn_score(&request);
        // 0.3 + 0.15 + 0.2 + 0.4 + 0.2 + 0.15
        assert!((score - 1.4).abs() < 1e-9);
        let verdict = ChurnVerdict::from_churn_probability(score);
        assert_eq!(verdict.prediction, 1);
        assert_eq!(verdict.class_probability, MAX_CHURN_PROBABILITY);
    }

    #[test]
    fn knn_loyal_customer_stays() {
        let request = loyal_churn_request();
        let score = knn_churn_score(&request);
        assert!((score - 0.05).abs() < 1e-9);
        let verdict = ChurnVerdict::from_churn_probability(score);
        assert_eq!(verdict.prediction, 0);
        assert!((verdict.class_probability - 0.95).abs() < 1e-9);
    }

    #[test]
    fn knn_charge_and_billing_bands() {
        let mut request = loyal_churn_request();
        request.monthly_charge = 20.0;
        request.paperless_billing = YesNo::No;
        request.tenure_months = 18.0;
        let score = knn_churn_score(&request);
        assert!((score - (0.05 + 0.1 + 0.1 + 0.1)).abs() < 1e-9);
    }

    #[test]
    fn logreg_probability_matches_hand_computed_logit() {
        let request = high_risk_churn_request();
        let logit: f64 = -2.5 - 0.06 + 1.1 + 1.2 + 0.8 + 0.4 + 0.1;
        let expected = 1.0 / (1.0 + (-logit).exp());
        assert!((logreg_churn_probability(&request) - expected).abs() < 1e-12);
        assert_eq!(ChurnVerdict::from_churn_probability(expected).prediction, 1);
    }

    #[test]
    fn logreg_loyal_customer_is_low_risk() {
        let p = logreg_churn_probability(&loyal_churn_request());
        assert!(p < 0.1);
        let verdict = ChurnVerdict::from_churn_probability(p);
        assert_eq!(verdict.prediction, 0);
        assert!(verdict.class_probability > 0.9);
    }

    #[test]
    fn verdict_reports_probability_of_predicted_class() {
        for churn in [0.0, 0.2, 0.49, 0.5, 0.73, 1.0] {
            let verdict = ChurnVerdict::from_churn_probability(churn);
            assert!((0.0..=1.0).contains(&verdict.class_probability));
            if verdict.prediction == 1 {
                assert!(verdict.class_probability >= CHURN_THRESHOLD);
            } else {
                assert!(verdict.class_probability > CHURN_THRESHOLD);
            }
        }
        let floor = ChurnVerdict::from_churn_probability(0.0);
        assert!((floor.class_probability - 0.99).abs() < 1e-12);
    }

    #[test]
    fn scoring_is_pure() {
        let request = high_risk_churn_request();
        assert_eq!(
            knn_churn_score(&request).to_bits(),
            knn_churn_score(&request).to_bits()
        );
        assert_eq!(
            logreg_churn_probability(&request).to_bits(),
            logreg_churn_probability(&request).to_bits()
        );
    }
}
