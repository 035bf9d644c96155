use std::env;
use std::path::PathBuf;
use std::time::Instant;

use customer_risk_infer::infer::{ChurnKnnTask, ChurnLogRegTask, Predictor};
use customer_risk_infer::models::ModelRegistry;
use customer_risk_infer::types::ChurnRequest;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let model_dir = PathBuf::from(env::var("MODEL_DIR").unwrap_or_else(|_| "models".to_string()));
    let registry = ModelRegistry::default();

    let knn = Predictor::load(
        ChurnKnnTask,
        &model_dir.join("churn_knn.safetensors"),
        true,
        &registry,
    );
    let logreg = Predictor::load(
        ChurnLogRegTask,
        &model_dir.join("churn_logreg.safetensors"),
        true,
        &registry,
    );
    println!("knn: {}, logreg: {}", knn.mode().as_str(), logreg.mode().as_str());

    let request: ChurnRequest = serde_json::from_str(
        r#"{
            "adulto_mayor": 1,
            "meses_como_cliente": 8,
            "cargo_mensual": 89.5,
            "tiene_pareja": "No",
            "dependientes": "No",
            "tipo_internet": "Fiber optic",
            "seguridad_en_linea": "No",
            "respaldo_en_linea": "Yes",
            "proteccion_dispositivo": "No",
            "soporte_tecnico": "No",
            "tipo_contrato": "Month-to-month",
            "facturacion_electronica": "Yes",
            "metodo_pago": "Electronic check"
        }"#,
    )?;

    let timer = Instant::now();
    let knn_response = knn.predict(&request)?;
    let logreg_response = logreg.predict(&request)?;
    println!("{}", serde_json::to_string_pretty(&knn_response)?);
    println!("{}", serde_json::to_string_pretty(&logreg_response)?);
    println!("predicted in {:?}", timer.elapsed());
    Ok(())
}
