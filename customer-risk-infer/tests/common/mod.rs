#![allow(dead_code)]

use candle_core::{Device, Tensor};
use customer_risk_infer::models::constants::{
    CENTROIDS_TENSOR, COEFFICIENTS_TENSOR, INTERCEPT_TENSOR, K_TENSOR, NEIGHBORS_TENSOR,
    NEIGHBOR_LABELS_TENSOR,
};
use customer_risk_infer::preprocess::{encode_churn, encode_credit, CHURN_FEATURES};
use customer_risk_infer::types::{ChurnRequest, CreditCardRequest};
use serde_json::json;
use std::collections::HashMap;
use std::path::Path;

pub fn high_risk_customer() -> ChurnRequest {
    serde_json::from_value(json!({
        "adulto_mayor": 0,
        "meses_como_cliente": 3,
        "cargo_mensual": 110.0,
        "tiene_pareja": "No",
        "dependientes": "No",
        "tipo_internet": "Fiber optic",
        "seguridad_en_linea": "No",
        "respaldo_en_linea": "No",
        "proteccion_dispositivo": "No",
        "soporte_tecnico": "No",
        "tipo_contrato": "Month-to-month",
        "facturacion_electronica": "Yes",
        "metodo_pago": "Electronic check"
    }))
    .unwrap()
}

pub fn loyal_customer() -> ChurnRequest {
    serde_json::from_value(json!({
        "adulto_mayor": 0,
        "meses_como_cliente": 60,
        "cargo_mensual": 65.0,
        "tiene_pareja": "Yes",
        "dependientes": "Yes",
        "tipo_internet": "DSL",
        "seguridad_en_linea": "Yes",
        "respaldo_en_linea": "Yes",
        "proteccion_dispositivo": "Yes",
        "soporte_tecnico": "Yes",
        "tipo_contrato": "Two year",
        "facturacion_electronica": "Yes",
        "metodo_pago": "Credit card (automatic)"
    }))
    .unwrap()
}

pub fn premium_account() -> CreditCardRequest {
    serde_json::from_value(json!({
        "Saldo": 1200.0,
        "Frecuencia_Saldo": 1.0,
        "Compras_Totales": 5000.0,
        "Compras_Contado": 3000.0,
        "Compras_Cuotas": 2000.0,
        "Avances_Efectivo": 0.0,
        "Frecuencia_Compras": 0.92,
        "Frec_Compras_Contado": 0.5,
        "Frec_Compras_Cuotas": 0.4,
        "Frec_Avances": 0.0,
        "Transacciones_Avance": 0,
        "Transacciones_Compra": 40,
        "Limite_Credito": 12000.0,
        "Pagos_Realizados": 9000.0,
        "Pago_Minimo": 300.0,
        "Pct_Pago_Completo": 0.8
    }))
    .unwrap()
}

fn row(values: &[f64]) -> Vec<f32> {
    values.iter().map(|v| *v as f32).collect()
}

fn save(path: &Path, tensors: Vec<(&str, Tensor)>) {
    let tensors = tensors
        .into_iter()
        .map(|(name, tensor)| (name.to_string(), tensor))
        .collect::<HashMap<_, _>>();
    candle_core::safetensors::save(&tensors, path).unwrap();
}

/// One neighbour per fixture customer, labelled with the opposite of what
/// the rule engine would say, so model answers are distinguishable.
pub fn write_churn_knn(dir: &Path) {
    let device = Device::Cpu;
    let mut points = row(encode_churn(&high_risk_customer()).values());
    points.extend(row(encode_churn(&loyal_customer()).values()));
    save(
        &dir.join("churn_knn.safetensors"),
        vec![
            (
                NEIGHBORS_TENSOR,
                Tensor::from_vec(points, (2, CHURN_FEATURES), &device).unwrap(),
            ),
            (NEIGHBOR_LABELS_TENSOR, Tensor::new(&[0i64, 1], &device).unwrap()),
            (K_TENSOR, Tensor::new(&[1i64], &device).unwrap()),
        ],
    );
}

/// Constant model: zero weights, intercept 2, churn probability ~0.88.
pub fn write_churn_logreg(dir: &Path) {
    let device = Device::Cpu;
    save(
        &dir.join("churn_logreg.safetensors"),
        vec![
            (
                COEFFICIENTS_TENSOR,
                Tensor::zeros(CHURN_FEATURES, candle_core::DType::F32, &device).unwrap(),
            ),
            (INTERCEPT_TENSOR, Tensor::new(&[2.0f32], &device).unwrap()),
        ],
    );
}

/// Five centroids with the premium account sitting on centroid 3.
pub fn write_credit_kmeans(dir: &Path) {
    let device = Device::Cpu;
    let premium = row(encode_credit(&premium_account()).values());
    let mut centroids = Vec::new();
    for cluster in 0..5 {
        if cluster == 3 {
            centroids.extend(premium.iter().copied());
        } else {
            centroids.extend(premium.iter().map(|v| v + 50_000.0 * (cluster + 1) as f32));
        }
    }
    save(
        &dir.join("credit_kmeans.safetensors"),
        vec![(
            CENTROIDS_TENSOR,
            Tensor::from_vec(centroids, (5, premium.len()), &device).unwrap(),
        )],
    );
}

pub fn write_all(dir: &Path) {
    write_churn_knn(dir);
    write_churn_logreg(dir);
    write_credit_kmeans(dir);
}
