use bigdecimal::BigDecimal;
use bigdecimal::Zero;
use serde::{Deserialize, Serialize};

/// Chain-level KPI rollup for one analysis period. Field names are the
/// dashboard's contract, kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuptureMetrics {
    pub quantite_commandee: i64,
    pub quantite_receptionnee: i64,
    pub montant_commande_ht: BigDecimal,
    pub montant_receptionne_ht: BigDecimal,
    pub delta_quantite: i64,
    pub delta_montant: BigDecimal,
    pub taux_reception_quantite: f64,
    pub taux_reception_montant: f64,
    pub nb_commandes: i64,
    pub nb_lignes_commandes: i64,
    pub nb_fournisseurs: i64,
    pub nb_references_total: i64,
    pub nb_references_rupture: i64,
    pub taux_references_rupture: f64,
    pub nb_ruptures_totales_courtes: i64,
    pub nb_ruptures_totales_longues: i64,
    pub nb_ruptures_partielles_courtes: i64,
    pub nb_ruptures_partielles_longues: i64,
    pub qte_rupture_totale: i64,
    pub qte_rupture_partielle: i64,
    pub taux_rupture_totale_pct: f64,
}

impl RuptureMetrics {
    /// All-zero metrics: the valid result for a window with no qualifying
    /// orders (not an error).
    pub fn zeroed() -> Self {
        Self {
            quantite_commandee: 0,
            quantite_receptionnee: 0,
            montant_commande_ht: BigDecimal::zero(),
            montant_receptionne_ht: BigDecimal::zero(),
            delta_quantite: 0,
            delta_montant: BigDecimal::zero(),
            taux_reception_quantite: 0.0,
            taux_reception_montant: 0.0,
            nb_commandes: 0,
            nb_lignes_commandes: 0,
            nb_fournisseurs: 0,
            nb_references_total: 0,
            nb_references_rupture: 0,
            taux_references_rupture: 0.0,
            nb_ruptures_totales_courtes: 0,
            nb_ruptures_totales_longues: 0,
            nb_ruptures_partielles_courtes: 0,
            nb_ruptures_partielles_longues: 0,
            qte_rupture_totale: 0,
            qte_rupture_partielle: 0,
            taux_rupture_totale_pct: 0.0,
        }
    }
}

/// Full response: current-period metrics, plus the comparison period when one
/// was requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuptureAnalysis {
    #[serde(flatten)]
    pub metrics: RuptureMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<RuptureMetrics>,
}
