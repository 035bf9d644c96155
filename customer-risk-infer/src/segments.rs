//! Cluster id to segment descriptor lookup.
//!
//! The table is built once at startup, either from the built-in profiles or
//! from a JSON file shipped next to a retrained artifact, and is read-only
//! afterwards. Lookups never fail: unknown ids get a generic profile.

use crate::errors::InferError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "bajo")]
    Low,
    #[serde(rename = "medio")]
    Medium,
    #[serde(rename = "alto")]
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentDetails {
    #[serde(rename = "riesgo")]
    pub risk: RiskLevel,
    #[serde(rename = "tipo_cliente")]
    pub customer_type: String,
    #[serde(rename = "recomendacion")]
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentDescriptor {
    pub cluster: i64,
    #[serde(rename = "nombre_segmento")]
    pub name: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "detalles")]
    pub details: SegmentDetails,
}

impl SegmentDescriptor {
    /// Descriptor for ids the table has no profile for.
    pub fn generic(cluster: i64) -> Self {
        SegmentDescriptor {
            cluster,
            name: format!("Segmento {}", cluster),
            description: format!("Cliente asignado al cluster {}.", cluster),
            details: SegmentDetails {
                risk: RiskLevel::Medium,
                customer_type: "estándar".to_string(),
                recommendation: "Monitoreo regular y ofertas personalizadas.".to_string(),
            },
        }
    }

    pub fn risk(&self) -> RiskLevel {
        self.details.risk
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentTable {
    profiles: BTreeMap<i64, SegmentDescriptor>,
}

impl SegmentTable {
    pub fn new(descriptors: Vec<SegmentDescriptor>) -> Result<Self, InferError> {
        let mut profiles = BTreeMap::new();
        for descriptor in descriptors {
            let cluster = descriptor.cluster;
            if profiles.insert(cluster, descriptor).is_some() {
                return Err(InferError::GenericError {
                    msg: format!("duplicate segment profile for cluster {}", cluster),
                });
            }
        }
        Ok(SegmentTable { profiles })
    }

    /// Profiles numbered the way the rule engine assigns clusters.
    pub fn builtin() -> Self {
        let profiles = builtin_profiles()
            .into_iter()
            .map(|descriptor| (descriptor.cluster, descriptor))
            .collect();
        SegmentTable { profiles }
    }

    pub fn from_json_str(json: &str) -> Result<Self, InferError> {
        let descriptors: Vec<SegmentDescriptor> = serde_json::from_str(json)?;
        Self::new(descriptors)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, InferError> {
        let json = std::fs::read_to_string(path)?;
        let table = Self::from_json_str(&json)?;
        info!(
            path = %path.display(),
            profiles = table.len(),
            "segment table loaded"
        );
        Ok(table)
    }

    pub fn interpret(&self, cluster: i64) -> SegmentDescriptor {
        match self.profiles.get(&cluster) {
            Some(descriptor) => descriptor.clone(),
            None => SegmentDescriptor::generic(cluster),
        }
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for SegmentTable {
    fn default() -> Self {
        Self::builtin()
    }
}

fn profile(
    cluster: i64,
    name: &str,
    description: &str,
    risk: RiskLevel,
    customer_type: &str,
    recommendation: &str,
) -> SegmentDescriptor {
    SegmentDescriptor {
        cluster,
        name: name.to_string(),
        description: description.to_string(),
        details: SegmentDetails {
            risk,
            customer_type: customer_type.to_string(),
            recommendation: recommendation.to_string(),
        },
    }
}

fn builtin_profiles() -> Vec<SegmentDescriptor> {
    vec![
        profile(
            0,
            "Clientes Premium de Bajo Riesgo",
            "Clientes con baja utilización del límite, compras frecuentes y pago completo del saldo. Prácticamente no usan avances en efectivo.",
            RiskLevel::Low,
            "premium_vip",
            "Ofrecer tarjetas gold/platinum, beneficios exclusivos (viajes, seguros, lounges), aumentos proactivos de límite y programas de lealtad premium.",
        ),
        profile(
            1,
            "Usuarios Rotativos Estables",
            "Clientes que mantienen un saldo moderado, compran con regularidad y cubren buena parte de su deuda cada mes con poco uso de avances.",
            RiskLevel::Medium,
            "moderado_responsable",
            "Ofrecer aumentos moderados de límite, programas de fidelización/cashback y financiamiento a cuotas con tasa preferencial.",
        ),
        profile(
            2,
            "Usuarios Dependientes de Avances",
            "Clientes que usan la tarjeta principalmente como fuente de efectivo: muchos avances y saldo alto respecto al límite. Muestran señales de estrés financiero.",
            RiskLevel::High,
            "dependiente_avances",
            "Implementar campañas de educación financiera, ofrecer refinanciación o consolidación de deuda, reducir el acceso a avances y activar alertas tempranas.",
        ),
        profile(
            3,
            "Clientes en Alto Riesgo de Impago",
            "Clientes con el límite casi agotado, pagos bajos frente al saldo, casi nunca pagan el total y apenas compran.",
            RiskLevel::High,
            "alto_riesgo",
            "Contactar de forma preventiva, proponer planes de pago, congelar aumentos de límite y reforzar el seguimiento de cobranza.",
        ),
        profile(
            4,
            "Clientes Inactivos o de Bajo Uso",
            "Clientes con compras muy poco frecuentes y saldo bajo. Pueden ser nuevos o poco interesados en la tarjeta.",
            RiskLevel::Low,
            "inactivo_bajo_uso",
            "Lanzar campañas de activación, beneficios por primeras compras y promociones de 0% interés para incentivar el uso.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpret_is_total() {
        let table = SegmentTable::builtin();
        for cluster in [i64::MIN, -1, 0, 4, 5, 1_000, i64::MAX] {
            let descriptor = table.interpret(cluster);
            assert_eq!(descriptor.cluster, cluster);
            assert!(!descriptor.name.is_empty());
        }
    }

    #[test]
    fn unknown_cluster_gets_generic_medium_risk() {
        let descriptor = SegmentTable::builtin().interpret(-3);
        assert_eq!(descriptor.name, "Segmento -3");
        assert_eq!(descriptor.risk(), RiskLevel::Medium);
        assert_eq!(descriptor.details.customer_type, "estándar");
    }

    #[test]
    fn builtin_covers_five_clusters() {
        let table = SegmentTable::builtin();
        assert_eq!(table.len(), 5);
        assert_eq!(table.interpret(0).risk(), RiskLevel::Low);
        assert_eq!(table.interpret(2).risk(), RiskLevel::High);
        assert_eq!(table.interpret(3).risk(), RiskLevel::High);
    }

    #[test]
    fn serializes_with_wire_names() {
        let json = serde_json::to_value(SegmentTable::builtin().interpret(3)).unwrap();
        assert_eq!(json["cluster"], 3);
        assert_eq!(json["detalles"]["riesgo"], "alto");
        assert!(json.get("nombre_segmento").is_some());
    }

    #[test]
    fn loads_table_from_json() {
        let json = r#"[
            {"cluster": 7, "nombre_segmento": "A", "descripcion": "a",
             "detalles": {"riesgo": "alto", "tipo_cliente": "x", "recomendacion": "y"}}
        ]"#;
        let table = SegmentTable::from_json_str(json).unwrap();
        assert_eq!(table.interpret(7).risk(), RiskLevel::High);
        assert_eq!(table.interpret(0), SegmentDescriptor::generic(0));
    }

    #[test]
    fn rejects_duplicate_profiles() {
        let descriptor = SegmentDescriptor::generic(1);
        assert!(SegmentTable::new(vec![descriptor.clone(), descriptor]).is_err());
    }

    #[test]
    fn loads_table_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("segments.json");
        let json = serde_json::to_string(&vec![SegmentDescriptor::generic(9)]).unwrap();
        std::fs::write(&path, json).unwrap();
        let table = SegmentTable::from_json_file(&path).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn shipped_trained_cluster_table_parses() {
        let table =
            SegmentTable::from_json_str(include_str!("../segments/trained_clusters.json")).unwrap();
        assert_eq!(table.len(), 5);
        assert_eq!(table.interpret(0).risk(), RiskLevel::High);
        assert_eq!(table.interpret(2).details.customer_type, "premium_vip");
        assert_eq!(table.interpret(3).details.customer_type, "frecuente_rentable");
        assert_eq!(table.interpret(4).risk(), RiskLevel::Low);
    }
}
