use crate::errors::InferError;
use crate::types::{check_integer, check_non_negative, ModelKind, Validate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum YesNo {
    Yes,
    No,
}

/// Answer domain of the four internet add-on questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddOnService {
    Yes,
    No,
    #[serde(rename = "No internet service")]
    NoInternetService,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InternetService {
    #[serde(rename = "DSL")]
    Dsl,
    #[serde(rename = "Fiber optic")]
    FiberOptic,
    No,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractType {
    #[serde(rename = "Month-to-month")]
    MonthToMonth,
    #[serde(rename = "One year")]
    OneYear,
    #[serde(rename = "Two year")]
    TwoYear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "Electronic check")]
    ElectronicCheck,
    #[serde(rename = "Mailed check")]
    MailedCheck,
    #[serde(rename = "Bank transfer (automatic)")]
    BankTransfer,
    #[serde(rename = "Credit card (automatic)")]
    CreditCard,
}

/// Customer profile scored by both churn models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChurnRequest {
    #[serde(rename = "adulto_mayor")]
    pub senior_citizen: f64,
    #[serde(rename = "meses_como_cliente")]
    pub tenure_months: f64,
    #[serde(rename = "cargo_mensual")]
    pub monthly_charge: f64,
    #[serde(rename = "tiene_pareja")]
    pub partner: YesNo,
    #[serde(rename = "dependientes")]
    pub dependents: YesNo,
    #[serde(rename = "tipo_internet")]
    pub internet: InternetService,
    #[serde(rename = "seguridad_en_linea")]
    pub online_security: AddOnService,
    #[serde(rename = "respaldo_en_linea")]
    pub online_backup: AddOnService,
    #[serde(rename = "proteccion_dispositivo")]
    pub device_protection: AddOnService,
    #[serde(rename = "soporte_tecnico")]
    pub tech_support: AddOnService,
    #[serde(rename = "tipo_contrato")]
    pub contract: ContractType,
    #[serde(rename = "facturacion_electronica")]
    pub paperless_billing: YesNo,
    #[serde(rename = "metodo_pago")]
    pub payment_method: PaymentMethod,
}

impl ChurnRequest {
    pub fn add_ons(&self) -> [AddOnService; 4] {
        [
            self.online_security,
            self.online_backup,
            self.device_protection,
            self.tech_support,
        ]
    }

    /// Number of add-on services answered "Yes".
    pub fn subscribed_add_ons(&self) -> usize {
        self.add_ons()
            .iter()
            .filter(|s| **s == AddOnService::Yes)
            .count()
    }
}

impl Validate for ChurnRequest {
    fn validate(&self) -> Result<(), InferError> {
        check_integer("adulto_mayor", self.senior_citizen)?;
        if self.senior_citizen > 1.0 {
            return Err(InferError::validation(
                "adulto_mayor",
                "must be less than or equal to 1",
            ));
        }
        check_integer("meses_como_cliente", self.tenure_months)?;
        check_non_negative("cargo_mensual", self.monthly_charge)?;
        Ok(())
    }
}

/// Wording tier of a churn message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceTier {
    High,
    Moderate,
    ModerateLow,
    Low,
}

impl ConfidenceTier {
    pub fn classify(prediction: u8, class_probability: f64) -> Self {
        if prediction == 1 {
            if class_probability >= 0.7 {
                return ConfidenceTier::High;
            }
            return ConfidenceTier::Moderate;
        }
        let churn_probability = 1.0 - class_probability;
        if churn_probability <= 0.3 {
            ConfidenceTier::Low
        } else {
            ConfidenceTier::ModerateLow
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ConfidenceTier::High => "El cliente tiene alta probabilidad de abandonar el servicio.",
            ConfidenceTier::Moderate => {
                "El cliente tiene probabilidad moderada de abandonar el servicio."
            }
            ConfidenceTier::ModerateLow => {
                "El cliente tiene probabilidad moderada-baja de abandonar el servicio."
            }
            ConfidenceTier::Low => "El cliente tiene baja probabilidad de abandonar el servicio.",
        }
    }
}

/// Rounds to two decimals, halves away from zero.
pub fn round_probability(probability: f64) -> f64 {
    (probability * 100.0).round() / 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChurnResponse {
    pub model: ModelKind,
    #[serde(rename = "prediccion")]
    pub prediction: u8,
    #[serde(rename = "probabilidad")]
    pub probability: f64,
    #[serde(rename = "mensaje")]
    pub message: String,
}

impl ChurnResponse {
    /// Builds the response from the predicted class and the probability of
    /// that class. Both prediction paths go through here.
    pub fn from_class_probability(model: ModelKind, prediction: u8, class_probability: f64) -> Self {
        let class_probability = class_probability.clamp(0.0, 1.0);
        let tier = ConfidenceTier::classify(prediction, class_probability);
        ChurnResponse {
            model,
            prediction,
            probability: round_probability(class_probability),
            message: tier.message().to_string(),
        }
    }
}
