use std::collections::{HashMap, HashSet};

use bigdecimal::{BigDecimal, ToPrimitive, Zero};

use crate::models::{ClassifiedLine, RuptureMetrics, StockoutStatus};

/// Roll classified lines up into the chain-level KPI set. Prices come from
/// the latest-known weighted-average purchase price per product; a product
/// with no known price contributes zero to the monetary amounts.
pub fn aggregate(
    classified: &[ClassifiedLine],
    prices: &HashMap<String, BigDecimal>,
) -> RuptureMetrics {
    if classified.is_empty() {
        return RuptureMetrics::zeroed();
    }

    let mut quantite_commandee: i64 = 0;
    let mut quantite_receptionnee: i64 = 0;
    let mut montant_commande_ht = BigDecimal::zero();
    let mut montant_receptionne_ht = BigDecimal::zero();

    let mut orders: HashSet<i64> = HashSet::new();
    let mut suppliers: HashSet<i64> = HashSet::new();
    let mut references: HashSet<&str> = HashSet::new();
    let mut rupture_references: HashSet<&str> = HashSet::new();

    let mut totales_courtes: i64 = 0;
    let mut totales_longues: i64 = 0;
    let mut partielles_courtes: i64 = 0;
    let mut partielles_longues: i64 = 0;
    let mut qte_rupture_totale: i64 = 0;
    let mut qte_rupture_partielle: i64 = 0;

    for entry in classified {
        let line = &entry.line;
        let ordered = i64::from(line.ordered_qty);
        let received = i64::from(line.received_qty);

        quantite_commandee += ordered;
        quantite_receptionnee += received;

        let price = prices.get(&line.product_code);
        if let Some(price) = price {
            montant_commande_ht += price * BigDecimal::from(ordered);
            montant_receptionne_ht += price * BigDecimal::from(received);
        }

        orders.insert(line.order_id);
        suppliers.insert(line.supplier_id);
        references.insert(line.product_code.as_str());
        if entry.status.is_rupture() {
            rupture_references.insert(line.product_code.as_str());
        }

        // The courte buckets absorb the mild cases so the four counters,
        // OK and NON_DETECTEE together cover every line exactly once.
        match entry.status {
            StockoutStatus::RuptureTotale | StockoutStatus::RuptureTotaleCourte => {
                totales_courtes += 1
            }
            StockoutStatus::RuptureTotaleLongue => totales_longues += 1,
            StockoutStatus::ReceptionPartielle | StockoutStatus::RuptureCourte => {
                partielles_courtes += 1
            }
            StockoutStatus::RuptureLongue => partielles_longues += 1,
            StockoutStatus::Ok | StockoutStatus::RuptureNonDetectee => {}
        }

        if entry.status.is_rupture_totale() {
            qte_rupture_totale += entry.missing_qty;
        } else if entry.status.is_rupture() {
            qte_rupture_partielle += entry.missing_qty;
        }
    }

    let nb_lignes_commandes = classified.len() as i64;
    let nb_commandes = orders.len() as i64;
    let delta_quantite = quantite_commandee - quantite_receptionnee;
    let delta_montant = &montant_commande_ht - &montant_receptionne_ht;

    let nb_references_total = references.len() as i64;
    let nb_references_rupture = rupture_references.len() as i64;

    RuptureMetrics {
        quantite_commandee,
        quantite_receptionnee,
        taux_reception_quantite: ratio_pct(quantite_receptionnee as f64, quantite_commandee as f64),
        taux_reception_montant: ratio_pct(
            montant_receptionne_ht.to_f64().unwrap_or(0.0),
            montant_commande_ht.to_f64().unwrap_or(0.0),
        ),
        montant_commande_ht,
        montant_receptionne_ht,
        delta_quantite,
        delta_montant,
        nb_commandes,
        nb_lignes_commandes,
        nb_fournisseurs: suppliers.len() as i64,
        nb_references_total,
        nb_references_rupture,
        taux_references_rupture: ratio_pct(nb_references_rupture as f64, nb_references_total as f64),
        nb_ruptures_totales_courtes: totales_courtes,
        nb_ruptures_totales_longues: totales_longues,
        nb_ruptures_partielles_courtes: partielles_courtes,
        nb_ruptures_partielles_longues: partielles_longues,
        qte_rupture_totale,
        qte_rupture_partielle,
        // Rate of total ruptures over distinct order headers.
        taux_rupture_totale_pct: ratio_pct(
            (totales_courtes + totales_longues) as f64,
            nb_commandes as f64,
        ),
    }
}

/// numerator / denominator × 100, with 0 for an empty denominator.
fn ratio_pct(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator * 100.0
    }
}
