use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use customer_risk_infer::infer::{CreditKmeansTask, Predictor};
use customer_risk_infer::models::ModelRegistry;
use customer_risk_infer::segments::SegmentTable;
use customer_risk_infer::types::CreditCardRequest;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let model_dir = PathBuf::from(env::var("MODEL_DIR").unwrap_or_else(|_| "models".to_string()));
    let segments = match env::var("CREDIT_SEGMENTS_FILE") {
        Ok(path) if !path.is_empty() => SegmentTable::from_json_file(Path::new(&path))?,
        _ => SegmentTable::builtin(),
    };

    let predictor = Predictor::load(
        CreditKmeansTask::new(Arc::new(segments)),
        &model_dir.join("credit_kmeans.safetensors"),
        true,
        &ModelRegistry::default(),
    );
    println!("kmeans: {}", predictor.mode().as_str());

    let request: CreditCardRequest = serde_json::from_str(
        r#"{
            "Saldo": 4100.0, "Frecuencia_Saldo": 1.0, "Compras_Totales": 150.0,
            "Compras_Contado": 150.0, "Compras_Cuotas": 0.0, "Avances_Efectivo": 2600.0,
            "Frecuencia_Compras": 0.08, "Frec_Compras_Contado": 0.08, "Frec_Compras_Cuotas": 0.0,
            "Frec_Avances": 0.5, "Transacciones_Avance": 9, "Transacciones_Compra": 1,
            "Limite_Credito": 5000.0, "Pagos_Realizados": 700.0, "Pago_Minimo": 900.0,
            "Pct_Pago_Completo": 0.0
        }"#,
    )?;

    let response = predictor.predict(&request)?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
