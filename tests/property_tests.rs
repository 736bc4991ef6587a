//! Property-based tests for the quantity and money invariants.
//!
//! Uses proptest to check totals, line diffing and reconciliation over a wide range of
//! generated inputs.

use atelier_api::{
    billing::{compute_totals, BillableLine},
    entities::{
        client_model::{CommandeVariantes, Variante},
        invoice_line, outbound_line,
    },
    line_diff::{diff_lines, IncomingLine, LineId, PersistedLine},
    reconciliation::{
        normalize, planning_rows, reconcile, split_commandes, InboundEntry, ModelOrders,
        OutboundEntry, PlanningFilter, ReconciliationSources,
    },
};
use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashSet;

fn price_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn rate_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000).prop_map(|basis| Decimal::new(basis, 2))
}

fn invoice_lines() -> impl Strategy<Value = Vec<invoice_line::Model>> {
    prop::collection::vec((0i32..10_000, price_strategy()), 0..12).prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(i, (quantity, unit_price))| invoice_line::Model {
                id: i as i32 + 1,
                invoice_id: 1,
                commande: "CMD".into(),
                model: "Model".into(),
                description: None,
                quantity,
                unit_price,
            })
            .collect()
    })
}

fn outbound_lines() -> impl Strategy<Value = Vec<outbound_line::Model>> {
    prop::collection::vec((0i32..10_000, price_strategy(), any::<bool>()), 0..12).prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(i, (quantity_livree, unit_price, is_excluded))| outbound_line::Model {
                id: i as i32 + 1,
                document_id: 1,
                client_model_id: None,
                model: "Model".into(),
                commande: "CMD".into(),
                description: None,
                quantity_livree,
                unit_price,
                is_excluded,
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn ttc_is_ht_plus_tva(lines in invoice_lines(), active in any::<bool>(), rate in rate_strategy()) {
        let totals = compute_totals(&lines, active, rate);
        prop_assert_eq!(totals.total_ttc, totals.total_ht + totals.total_tva);
        if !active {
            prop_assert_eq!(totals.total_tva, Decimal::ZERO);
        }
        prop_assert!(totals.total_tva >= Decimal::ZERO);
    }

    #[test]
    fn excluded_lines_never_change_totals(lines in outbound_lines(), rate in rate_strategy()) {
        let billable: Vec<outbound_line::Model> =
            lines.iter().filter(|l| !l.is_excluded).cloned().collect();
        prop_assert_eq!(
            compute_totals(&lines, true, rate),
            compute_totals(&billable, true, rate)
        );
        let expected: Decimal = billable.iter().map(BillableLine::amount).sum();
        prop_assert_eq!(compute_totals(&lines, false, rate).total_ht, expected);
    }
}

#[derive(Debug, Clone)]
struct Stored {
    id: i32,
    qty: i32,
}

#[derive(Debug, Clone)]
struct Edit {
    id: Option<LineId>,
    qty: i32,
}

impl PersistedLine for Stored {
    fn line_id(&self) -> i32 {
        self.id
    }
}

impl IncomingLine<Stored> for Edit {
    fn line_id(&self) -> Option<i32> {
        self.id.as_ref().and_then(LineId::persisted)
    }

    fn differs_from(&self, persisted: &Stored) -> bool {
        self.qty != persisted.qty
    }
}

fn edit_strategy() -> impl Strategy<Value = Edit> {
    let id = prop_oneof![
        Just(None),
        (1i32..20).prop_map(|id| Some(LineId::Persisted(id))),
        "[a-z]{4}".prop_map(|tmp| Some(LineId::Temporary(serde_json::Value::String(tmp)))),
    ];
    (id, 0i32..5).prop_map(|(id, qty)| Edit { id, qty })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn every_incoming_line_is_accounted_once(
        stored_ids in prop::collection::hash_set(1i32..20, 0..10),
        edits in prop::collection::vec(edit_strategy(), 0..15),
    ) {
        let persisted: Vec<Stored> = stored_ids.iter().map(|&id| Stored { id, qty: 1 }).collect();
        let diff = diff_lines(&persisted, &edits);

        prop_assert_eq!(
            diff.inserts.len() + diff.updates.len() + diff.unchanged.len(),
            edits.len()
        );

        let touched: HashSet<i32> = diff
            .updates
            .iter()
            .map(|(id, _)| *id)
            .chain(diff.unchanged.iter().copied())
            .collect();
        prop_assert_eq!(touched.len(), diff.updates.len() + diff.unchanged.len());
        for id in &diff.deletes {
            prop_assert!(stored_ids.contains(id));
            prop_assert!(!touched.contains(id));
        }
        prop_assert_eq!(touched.len() + diff.deletes.len(), stored_ids.len());
    }
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

fn model(total_per_variant: Vec<i32>) -> ModelOrders {
    ModelOrders {
        client_model_id: Some(1),
        client: "Maison Nord".into(),
        model: "Veste".into(),
        commandes: Some("CMD-1".into()),
        orders: vec![CommandeVariantes {
            commande: "CMD-1".into(),
            variantes: total_per_variant
                .into_iter()
                .enumerate()
                .map(|(i, quantity)| Variante {
                    name: format!("V{i}"),
                    quantity,
                })
                .collect(),
        }],
    }
}

fn outbound(quantity_livree: i32, is_excluded: bool, client: &str) -> OutboundEntry {
    OutboundEntry {
        document_id: 1,
        kind: "livraison".into(),
        reference: "BL".into(),
        date: day(),
        client: client.into(),
        client_model_id: None,
        model: " veste".into(),
        commande: "cmd-1 ".into(),
        quantity_livree,
        is_excluded,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn reconciliation_sums_match_their_sources(
        variants in prop::collection::vec(0i32..500, 1..6),
        received in prop::collection::vec(0i32..500, 0..6),
        delivered in prop::collection::vec((0i32..500, any::<bool>()), 0..6),
    ) {
        let model = model(variants.clone());
        let sources = ReconciliationSources {
            models: vec![model.clone()],
            inbound: received
                .iter()
                .map(|&quantity_recu| InboundEntry {
                    document_id: 1,
                    kind: "import".into(),
                    reference: "DI".into(),
                    date: day(),
                    client: "MAISON NORD".into(),
                    client_model_id: Some(1),
                    model: "renamed".into(),
                    commande: "CMD-1".into(),
                    quantity_recu,
                    quantity_trouve: quantity_recu,
                })
                .collect(),
            outbound: delivered
                .iter()
                .map(|&(qty, excluded)| outbound(qty, excluded, "maison nord"))
                .collect(),
            ..Default::default()
        };

        let orders = reconcile(&sources, &model);
        prop_assert_eq!(orders.len(), 1);
        let order = &orders[0];
        prop_assert_eq!(order.quantity_total, variants.iter().map(|&q| i64::from(q)).sum::<i64>());
        prop_assert_eq!(order.quantity_received, received.iter().map(|&q| i64::from(q)).sum::<i64>());
        prop_assert_eq!(
            order.quantity_delivered,
            delivered.iter().filter(|(_, ex)| !ex).map(|&(q, _)| i64::from(q)).sum::<i64>()
        );

        let rows = planning_rows(&sources, &PlanningFilter::default());
        prop_assert_eq!(rows.len(), 1);
        prop_assert_eq!(rows[0].outbound_missing, order.quantity_total - order.quantity_delivered);
    }

    #[test]
    fn other_clients_never_leak_into_a_model(qty in 1i32..500) {
        let model = model(vec![10]);
        let sources = ReconciliationSources {
            models: vec![model.clone()],
            outbound: vec![outbound(qty, false, "Maison Sud")],
            ..Default::default()
        };
        prop_assert_eq!(reconcile(&sources, &model)[0].quantity_delivered, 0);
    }

    #[test]
    fn split_commandes_yields_unique_trimmed_codes(codes in prop::collection::vec("[ A-Za-z0-9-]{0,8}", 0..8)) {
        let split = split_commandes(&codes.join(","));
        let mut seen = HashSet::new();
        for code in &split {
            prop_assert!(!code.is_empty());
            prop_assert_eq!(code.trim(), code.as_str());
            prop_assert!(seen.insert(normalize(code)));
        }
    }
}
