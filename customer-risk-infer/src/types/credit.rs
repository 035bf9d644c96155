use crate::errors::InferError;
use crate::segments::SegmentDescriptor;
use crate::types::{check_non_negative, check_unit_interval, ModelKind, Validate};
use serde::{Deserialize, Serialize};

/// Credit card account summary used for behavioural segmentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditCardRequest {
    #[serde(rename = "Saldo")]
    pub balance: f64,
    #[serde(rename = "Frecuencia_Saldo")]
    pub balance_frequency: f64,
    #[serde(rename = "Compras_Totales")]
    pub purchases: f64,
    #[serde(rename = "Compras_Contado")]
    pub oneoff_purchases: f64,
    #[serde(rename = "Compras_Cuotas")]
    pub installment_purchases: f64,
    #[serde(rename = "Avances_Efectivo")]
    pub cash_advance: f64,
    #[serde(rename = "Frecuencia_Compras")]
    pub purchases_frequency: f64,
    #[serde(rename = "Frec_Compras_Contado")]
    pub oneoff_purchases_frequency: f64,
    #[serde(rename = "Frec_Compras_Cuotas")]
    pub installment_purchases_frequency: f64,
    #[serde(rename = "Frec_Avances")]
    pub cash_advance_frequency: f64,
    #[serde(rename = "Transacciones_Avance")]
    pub cash_advance_trx: f64,
    #[serde(rename = "Transacciones_Compra")]
    pub purchases_trx: f64,
    #[serde(rename = "Limite_Credito")]
    pub credit_limit: f64,
    #[serde(rename = "Pagos_Realizados")]
    pub payments: f64,
    #[serde(rename = "Pago_Minimo")]
    pub minimum_payments: f64,
    #[serde(rename = "Pct_Pago_Completo")]
    pub prc_full_payment: f64,
}

impl Validate for CreditCardRequest {
    fn validate(&self) -> Result<(), InferError> {
        check_non_negative("Saldo", self.balance)?;
        check_unit_interval("Frecuencia_Saldo", self.balance_frequency)?;
        check_non_negative("Compras_Totales", self.purchases)?;
        check_non_negative("Compras_Contado", self.oneoff_purchases)?;
        check_non_negative("Compras_Cuotas", self.installment_purchases)?;
        check_non_negative("Avances_Efectivo", self.cash_advance)?;
        check_unit_interval("Frecuencia_Compras", self.purchases_frequency)?;
        check_unit_interval("Frec_Compras_Contado", self.oneoff_purchases_frequency)?;
        check_unit_interval("Frec_Compras_Cuotas", self.installment_purchases_frequency)?;
        check_unit_interval("Frec_Avances", self.cash_advance_frequency)?;
        check_non_negative("Transacciones_Avance", self.cash_advance_trx)?;
        check_non_negative("Transacciones_Compra", self.purchases_trx)?;
        check_non_negative("Limite_Credito", self.credit_limit)?;
        check_non_negative("Pagos_Realizados", self.payments)?;
        check_non_negative("Pago_Minimo", self.minimum_payments)?;
        check_unit_interval("Pct_Pago_Completo", self.prc_full_payment)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentationResponse {
    pub model: ModelKind,
    pub cluster: i64,
    #[serde(rename = "segmentacion")]
    pub segment: SegmentDescriptor,
}
