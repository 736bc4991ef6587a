//! Cross-entity quantity reconciliation.
//!
//! Ordered quantities come from client-model variants, received quantities from inbound lines
//! (import declarations and incoming deliveries), delivered quantities from outbound lines
//! (export declarations and delivery notes) and first-activity dates from cutting and sewing
//! sheets. Everything here is pure and works on collections already loaded by the services,
//! so the dashboard, planning and état endpoints all aggregate the same way.
//!
//! Records are joined on a normalised `(client, model, commande)` key: trimmed and lowercased.
//! When both sides carry a client-model id, the id decides the model component instead of the
//! model name.

use crate::entities::client_model::CommandeVariantes;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use utoipa::ToSchema;

/// Normalised form used for every key comparison.
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

pub fn same_key(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

/// Splits a free-text comma separated order list, trimming entries and dropping empty and
/// case-insensitive duplicate codes. First spelling wins.
pub fn split_commandes(list: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    list.split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .filter(|code| seen.insert(normalize(code)))
        .map(str::to_string)
        .collect()
}

/// Order codes of a model: codes from the free-text list first, then any code that only appears
/// in the variant structure.
pub fn order_codes(commandes: Option<&str>, orders: &[CommandeVariantes]) -> Vec<String> {
    let mut codes = commandes.map(split_commandes).unwrap_or_default();
    let mut seen: HashSet<String> = codes.iter().map(|c| normalize(c)).collect();
    for order in orders {
        let code = order.commande.trim();
        if !code.is_empty() && seen.insert(normalize(code)) {
            codes.push(code.to_string());
        }
    }
    codes
}

/// Ordered quantity of `commande` in a model's variants, 0 when the model has no such order.
pub fn ordered_quantity(orders: &[CommandeVariantes], commande: &str) -> i64 {
    orders
        .iter()
        .filter(|o| same_key(&o.commande, commande))
        .map(CommandeVariantes::total)
        .sum()
}

/// A client model with its decoded orders.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelOrders {
    pub client_model_id: Option<i32>,
    pub client: String,
    pub model: String,
    pub commandes: Option<String>,
    pub orders: Vec<CommandeVariantes>,
}

impl ModelOrders {
    pub fn codes(&self) -> Vec<String> {
        order_codes(self.commandes.as_deref(), &self.orders)
    }
}

/// One line of an import declaration or incoming delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEntry {
    pub document_id: i32,
    pub kind: String,
    pub reference: String,
    pub date: NaiveDate,
    pub client: String,
    pub client_model_id: Option<i32>,
    pub model: String,
    pub commande: String,
    pub quantity_recu: i32,
    pub quantity_trouve: i32,
}

/// One line of an export declaration or delivery note.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundEntry {
    pub document_id: i32,
    pub kind: String,
    pub reference: String,
    pub date: NaiveDate,
    pub client: String,
    pub client_model_id: Option<i32>,
    pub model: String,
    pub commande: String,
    pub quantity_livree: i32,
    pub is_excluded: bool,
}

/// Creation of a cutting or sewing sheet, used only for first-activity dates.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetActivity {
    pub client: String,
    pub client_model_id: Option<i32>,
    pub model: String,
    pub commande: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct ReconciliationSources {
    pub models: Vec<ModelOrders>,
    pub inbound: Vec<InboundEntry>,
    pub outbound: Vec<OutboundEntry>,
    pub cuts: Vec<SheetActivity>,
    pub sewing: Vec<SheetActivity>,
}

/// The `(client, model, commande)` side a record is matched against.
#[derive(Debug, Clone, Copy)]
struct KeyRef<'a> {
    client: &'a str,
    client_model_id: Option<i32>,
    model: &'a str,
    commande: &'a str,
}

impl KeyRef<'_> {
    fn matches(&self, other: &KeyRef<'_>) -> bool {
        if !same_key(self.client, other.client) || !same_key(self.commande, other.commande) {
            return false;
        }
        match (self.client_model_id, other.client_model_id) {
            (Some(a), Some(b)) => a == b,
            _ => same_key(self.model, other.model),
        }
    }
}

impl InboundEntry {
    fn key(&self) -> KeyRef<'_> {
        KeyRef {
            client: &self.client,
            client_model_id: self.client_model_id,
            model: &self.model,
            commande: &self.commande,
        }
    }

    /// Declared minus counted. Negative values are flagged in reports, never rejected.
    pub fn inbound_missing(&self) -> i64 {
        i64::from(self.quantity_recu) - i64::from(self.quantity_trouve)
    }
}

impl OutboundEntry {
    fn key(&self) -> KeyRef<'_> {
        KeyRef {
            client: &self.client,
            client_model_id: self.client_model_id,
            model: &self.model,
            commande: &self.commande,
        }
    }
}

impl SheetActivity {
    fn key(&self) -> KeyRef<'_> {
        KeyRef {
            client: &self.client,
            client_model_id: self.client_model_id,
            model: &self.model,
            commande: &self.commande,
        }
    }
}

/// Per-order reconciliation of one model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderReconciliation {
    pub commande: String,
    pub quantity_total: i64,
    pub quantity_received: i64,
    pub quantity_delivered: i64,
}

fn received_for(inbound: &[InboundEntry], key: &KeyRef<'_>) -> i64 {
    inbound
        .iter()
        .filter(|line| line.key().matches(key))
        .map(|line| i64::from(line.quantity_recu))
        .sum()
}

fn delivered_for(outbound: &[OutboundEntry], key: &KeyRef<'_>) -> i64 {
    outbound
        .iter()
        .filter(|line| !line.is_excluded && line.key().matches(key))
        .map(|line| i64::from(line.quantity_livree))
        .sum()
}

fn first_activity(sheets: &[SheetActivity], key: &KeyRef<'_>) -> Option<DateTime<Utc>> {
    sheets
        .iter()
        .filter(|sheet| sheet.key().matches(key))
        .map(|sheet| sheet.created_at)
        .min()
}

fn reconcile_orders(sources: &ReconciliationSources, model: &ModelOrders) -> Vec<OrderReconciliation> {
    model
        .codes()
        .into_iter()
        .map(|commande| {
            let key = KeyRef {
                client: &model.client,
                client_model_id: model.client_model_id,
                model: &model.model,
                commande: &commande,
            };
            OrderReconciliation {
                quantity_total: ordered_quantity(&model.orders, &commande),
                quantity_received: received_for(&sources.inbound, &key),
                quantity_delivered: delivered_for(&sources.outbound, &key),
                commande: commande.clone(),
            }
        })
        .collect()
}

/// Ordered, received and delivered quantities per order code of the model named `model` for
/// client `client`. An unknown model, or a model without orders, yields no rows.
pub fn reconcile_model(
    sources: &ReconciliationSources,
    client: &str,
    model: &str,
) -> Vec<OrderReconciliation> {
    sources
        .models
        .iter()
        .find(|m| same_key(&m.client, client) && same_key(&m.model, model))
        .map(|m| reconcile_orders(sources, m))
        .unwrap_or_default()
}

/// Same as [`reconcile_model`] for an already resolved model.
pub fn reconcile(sources: &ReconciliationSources, model: &ModelOrders) -> Vec<OrderReconciliation> {
    reconcile_orders(sources, model)
}

/// One planning / état row per `(client, model, commande)` known from client models.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PlanningRow {
    pub client: String,
    pub client_model_id: Option<i32>,
    pub model: String,
    pub commande: String,
    pub quantity_total: i64,
    pub quantity_received: i64,
    pub quantity_delivered: i64,
    /// Ordered minus delivered
    pub outbound_missing: i64,
    pub first_cut_at: Option<DateTime<Utc>>,
    pub first_sewing_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanningFilter {
    pub client: Option<String>,
    pub model: Option<String>,
}

impl PlanningFilter {
    fn accepts(&self, model: &ModelOrders) -> bool {
        let wanted = |filter: &Option<String>, value: &str| {
            filter
                .as_deref()
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map_or(true, |f| same_key(f, value))
        };
        wanted(&self.client, &model.client) && wanted(&self.model, &model.model)
    }
}

pub fn planning_rows(sources: &ReconciliationSources, filter: &PlanningFilter) -> Vec<PlanningRow> {
    let mut rows = Vec::new();
    for model in sources.models.iter().filter(|m| filter.accepts(m)) {
        for order in reconcile_orders(sources, model) {
            let key = KeyRef {
                client: &model.client,
                client_model_id: model.client_model_id,
                model: &model.model,
                commande: &order.commande,
            };
            rows.push(PlanningRow {
                client: model.client.clone(),
                client_model_id: model.client_model_id,
                model: model.model.clone(),
                first_cut_at: first_activity(&sources.cuts, &key),
                first_sewing_at: first_activity(&sources.sewing, &key),
                outbound_missing: order.quantity_total - order.quantity_delivered,
                commande: order.commande,
                quantity_total: order.quantity_total,
                quantity_received: order.quantity_received,
                quantity_delivered: order.quantity_delivered,
            });
        }
    }
    rows
}

/// Inbound état row: one per inbound line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct InboundReportRow {
    pub document_id: i32,
    pub kind: String,
    pub reference: String,
    pub date: NaiveDate,
    pub client: String,
    pub model: String,
    pub commande: String,
    pub quantity_recu: i32,
    pub quantity_trouve: i32,
    /// Received minus found
    pub inbound_missing: i64,
    pub flagged: bool,
}

pub fn inbound_report(inbound: &[InboundEntry]) -> Vec<InboundReportRow> {
    let mut rows: Vec<InboundReportRow> = inbound
        .iter()
        .map(|line| {
            let missing = line.inbound_missing();
            InboundReportRow {
                document_id: line.document_id,
                kind: line.kind.clone(),
                reference: line.reference.clone(),
                date: line.date,
                client: line.client.clone(),
                model: line.model.clone(),
                commande: line.commande.clone(),
                quantity_recu: line.quantity_recu,
                quantity_trouve: line.quantity_trouve,
                inbound_missing: missing,
                flagged: missing < 0,
            }
        })
        .collect();
    rows.sort_by(|a, b| a.date.cmp(&b.date).then(a.document_id.cmp(&b.document_id)));
    rows
}

/// Outbound état row: one per order known from client models, plus one per key of outbound
/// lines that match no model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct OutboundReportRow {
    pub client: String,
    pub model: String,
    pub commande: String,
    pub quantity_total: i64,
    pub quantity_delivered: i64,
    /// Quantity on excluded lines (repairs, returns); never counted as delivered
    pub quantity_excluded: i64,
    /// Ordered minus delivered
    pub outbound_missing: i64,
    pub flagged: bool,
    pub last_delivery: Option<NaiveDate>,
}

/// Model component of a grouping key: the client-model id when known, the normalised name otherwise.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum ModelKey {
    Id(i32),
    Name(String),
}

impl ModelKey {
    fn of(client_model_id: Option<i32>, model: &str) -> Self {
        client_model_id.map_or_else(|| ModelKey::Name(normalize(model)), ModelKey::Id)
    }
}

type GroupKey = (String, ModelKey, String);

fn empty_row(client: &str, model: &str, commande: &str, ordered: i64) -> OutboundReportRow {
    OutboundReportRow {
        client: client.trim().to_string(),
        model: model.trim().to_string(),
        commande: commande.trim().to_string(),
        quantity_total: ordered,
        quantity_delivered: 0,
        quantity_excluded: 0,
        outbound_missing: 0,
        flagged: false,
        last_delivery: None,
    }
}

/// Rows are keyed the way planning matches lines, so both views agree on delivered and missing
/// quantities. Orders with nothing delivered yet are listed with their full ordered quantity.
pub fn outbound_report(sources: &ReconciliationSources) -> Vec<OutboundReportRow> {
    let mut groups: BTreeMap<GroupKey, OutboundReportRow> = BTreeMap::new();

    for model in &sources.models {
        for commande in model.codes() {
            let group_key = (
                normalize(&model.client),
                ModelKey::of(model.client_model_id, &model.model),
                normalize(&commande),
            );
            groups.entry(group_key).or_insert_with(|| {
                empty_row(
                    &model.client,
                    &model.model,
                    &commande,
                    ordered_quantity(&model.orders, &commande),
                )
            });
        }
    }

    for line in &sources.outbound {
        let owner = sources.models.iter().find(|m| {
            KeyRef {
                client: &m.client,
                client_model_id: m.client_model_id,
                model: &m.model,
                commande: &line.commande,
            }
            .matches(&line.key())
        });
        let row = match owner {
            Some(m) => groups
                .entry((
                    normalize(&m.client),
                    ModelKey::of(m.client_model_id, &m.model),
                    normalize(&line.commande),
                ))
                .or_insert_with(|| {
                    empty_row(
                        &m.client,
                        &m.model,
                        &line.commande,
                        ordered_quantity(&m.orders, &line.commande),
                    )
                }),
            None => groups
                .entry((
                    normalize(&line.client),
                    ModelKey::of(line.client_model_id, &line.model),
                    normalize(&line.commande),
                ))
                .or_insert_with(|| empty_row(&line.client, &line.model, &line.commande, 0)),
        };

        if line.is_excluded {
            row.quantity_excluded += i64::from(line.quantity_livree);
        } else {
            row.quantity_delivered += i64::from(line.quantity_livree);
            row.last_delivery = row.last_delivery.max(Some(line.date));
        }
    }

    groups
        .into_values()
        .map(|mut row| {
            row.outbound_missing = row.quantity_total - row.quantity_delivered;
            row.flagged = row.outbound_missing < 0;
            row
        })
        .collect()
}

/// Grand totals over planning rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ReconciliationTotals {
    pub orders: usize,
    pub quantity_total: i64,
    pub quantity_received: i64,
    pub quantity_delivered: i64,
    pub outbound_missing: i64,
    /// Orders not yet fully delivered
    pub open_orders: usize,
}

pub fn totals(rows: &[PlanningRow]) -> ReconciliationTotals {
    rows.iter().fold(ReconciliationTotals::default(), |mut acc, row| {
        acc.orders += 1;
        acc.quantity_total += row.quantity_total;
        acc.quantity_received += row.quantity_received;
        acc.quantity_delivered += row.quantity_delivered;
        acc.outbound_missing += row.outbound_missing;
        if row.outbound_missing > 0 {
            acc.open_orders += 1;
        }
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::client_model::Variante;
    use chrono::TimeZone;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn model(client: &str, name: &str, orders: Vec<(&str, Vec<(&str, i32)>)>) -> ModelOrders {
        ModelOrders {
            client_model_id: None,
            client: client.into(),
            model: name.into(),
            commandes: None,
            orders: orders
                .into_iter()
                .map(|(code, variants)| CommandeVariantes {
                    commande: code.into(),
                    variantes: variants
                        .into_iter()
                        .map(|(n, q)| Variante { name: n.into(), quantity: q })
                        .collect(),
                })
                .collect(),
        }
    }

    fn inbound(client: &str, model: &str, commande: &str, recu: i32, trouve: i32) -> InboundEntry {
        InboundEntry {
            document_id: 1,
            kind: "declaration_import".into(),
            reference: "IMP-1".into(),
            date: day(1),
            client: client.into(),
            client_model_id: None,
            model: model.into(),
            commande: commande.into(),
            quantity_recu: recu,
            quantity_trouve: trouve,
        }
    }

    fn outbound(client: &str, model: &str, commande: &str, qty: i32, excluded: bool) -> OutboundEntry {
        OutboundEntry {
            document_id: 1,
            kind: "declaration_export".into(),
            reference: "EXP-1".into(),
            date: day(5),
            client: client.into(),
            client_model_id: None,
            model: model.into(),
            commande: commande.into(),
            quantity_livree: qty,
            is_excluded: excluded,
        }
    }

    fn scenario() -> ReconciliationSources {
        ReconciliationSources {
            models: vec![model("ClientA", "ModelX", vec![("CMD1", vec![("S", 10), ("M", 20)])])],
            inbound: vec![
                inbound("ClientA", "ModelX", "CMD1", 12, 12),
                inbound("ClientA", "ModelX", "CMD1", 8, 7),
            ],
            outbound: vec![
                outbound("ClientA", "ModelX", "CMD1", 15, false),
                outbound("ClientA", "ModelX", "CMD1", 5, true),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn reconciles_ordered_received_and_delivered() {
        let rows = reconcile_model(&scenario(), "ClientA", "ModelX");
        assert_eq!(
            rows,
            vec![OrderReconciliation {
                commande: "CMD1".into(),
                quantity_total: 30,
                quantity_received: 20,
                quantity_delivered: 15,
            }]
        );
    }

    #[test]
    fn matching_ignores_case_and_surrounding_whitespace() {
        let mut sources = scenario();
        sources.inbound = vec![
            inbound("ClientA", "ModelX", "CMD1", 1, 1),
            inbound("clienta ", " modelx", "cmd1 ", 2, 2),
            inbound(" ClientA", "MODELX", " Cmd1", 4, 4),
        ];
        let rows = reconcile_model(&sources, "  CLIENTA", "modelx ");
        assert_eq!(rows[0].quantity_received, 7);
    }

    #[test]
    fn model_without_orders_yields_no_rows() {
        let sources = ReconciliationSources {
            models: vec![model("ClientA", "Empty", vec![])],
            ..Default::default()
        };
        assert!(reconcile_model(&sources, "ClientA", "Empty").is_empty());
        assert!(reconcile_model(&sources, "ClientA", "Unknown").is_empty());
    }

    #[test]
    fn order_listed_only_in_free_text_has_zero_total() {
        let mut m = model("ClientA", "ModelX", vec![("CMD1", vec![("S", 3)])]);
        m.commandes = Some("CMD0, cmd1 ,,CMD2".into());
        let sources = ReconciliationSources {
            models: vec![m],
            ..Default::default()
        };
        let rows = reconcile_model(&sources, "ClientA", "ModelX");
        let codes: Vec<_> = rows.iter().map(|r| r.commande.as_str()).collect();
        assert_eq!(codes, vec!["CMD0", "cmd1", "CMD2"]);
        assert_eq!(rows[0].quantity_total, 0);
        assert_eq!(rows[1].quantity_total, 3);
    }

    #[test]
    fn model_id_overrides_model_name_when_both_sides_have_it() {
        let mut m = model("ClientA", "ModelX", vec![("CMD1", vec![("S", 10)])]);
        m.client_model_id = Some(7);
        let mut renamed = inbound("ClientA", "Model X (old name)", "CMD1", 4, 4);
        renamed.client_model_id = Some(7);
        let mut other_model = inbound("ClientA", "ModelX", "CMD1", 100, 100);
        other_model.client_model_id = Some(8);
        let sources = ReconciliationSources {
            models: vec![m],
            inbound: vec![renamed, other_model, inbound("ClientA", "modelx", "CMD1", 1, 1)],
            ..Default::default()
        };
        let rows = reconcile_model(&sources, "ClientA", "ModelX");
        assert_eq!(rows[0].quantity_received, 5);
    }

    #[test]
    fn planning_rows_carry_outbound_missing_and_first_activity() {
        let mut sources = scenario();
        let early = Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 2, 9, 8, 0, 0).unwrap();
        for at in [late, early] {
            sources.cuts.push(SheetActivity {
                client: "clienta".into(),
                client_model_id: None,
                model: "modelx".into(),
                commande: "cmd1".into(),
                created_at: at,
            });
        }

        let rows = planning_rows(&sources, &PlanningFilter::default());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].outbound_missing, 15);
        assert_eq!(rows[0].first_cut_at, Some(early));
        assert_eq!(rows[0].first_sewing_at, None);

        let filtered = planning_rows(
            &sources,
            &PlanningFilter {
                client: Some("other".into()),
                model: None,
            },
        );
        assert!(filtered.is_empty());
    }

    #[test]
    fn inbound_report_flags_surplus_lines() {
        let rows = inbound_report(&[
            inbound("ClientA", "ModelX", "CMD1", 10, 8),
            inbound("ClientA", "ModelX", "CMD1", 10, 12),
        ]);
        assert_eq!(rows[0].inbound_missing, 2);
        assert!(!rows[0].flagged);
        assert_eq!(rows[1].inbound_missing, -2);
        assert!(rows[1].flagged);
    }

    #[test]
    fn outbound_report_groups_by_normalised_key() {
        let mut sources = scenario();
        sources
            .outbound
            .push(outbound(" clienta", "MODELX ", "cmd1", 20, false));
        let rows = outbound_report(&sources);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].quantity_delivered, 35);
        assert_eq!(rows[0].quantity_excluded, 5);
        assert_eq!(rows[0].outbound_missing, -5);
        assert!(rows[0].flagged);
    }

    #[test]
    fn outbound_report_merges_spellings_of_one_model_id() {
        let mut m = model("ClientA", "ModelX", vec![("CMD1", vec![("S", 10), ("M", 20)])]);
        m.client_model_id = Some(7);
        let mut current = outbound("ClientA", "ModelX", "CMD1", 10, false);
        current.client_model_id = Some(7);
        let mut old_name = outbound("ClientA", "Model X (old)", "CMD1", 10, false);
        old_name.client_model_id = Some(7);
        let sources = ReconciliationSources {
            models: vec![m],
            outbound: vec![current, old_name],
            ..Default::default()
        };

        let rows = outbound_report(&sources);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].model, "ModelX");
        assert_eq!(rows[0].quantity_delivered, 20);
        assert_eq!(rows[0].outbound_missing, 10);

        let planned: i64 = planning_rows(&sources, &PlanningFilter::default())
            .iter()
            .map(|r| r.outbound_missing)
            .sum();
        let reported: i64 = rows.iter().map(|r| r.outbound_missing).sum();
        assert_eq!(reported, planned);
    }

    #[test]
    fn outbound_report_lists_undelivered_orders() {
        let sources = ReconciliationSources {
            models: vec![model(
                "ClientA",
                "ModelX",
                vec![("CMD1", vec![("S", 10)]), ("CMD2", vec![("S", 4)])],
            )],
            outbound: vec![
                outbound("ClientA", "ModelX", "CMD1", 10, false),
                outbound("ClientB", "Stray", "CMD9", 3, false),
            ],
            ..Default::default()
        };

        let rows = outbound_report(&sources);
        assert_eq!(rows.len(), 3);
        let cmd2 = rows.iter().find(|r| r.commande == "CMD2").unwrap();
        assert_eq!(cmd2.quantity_delivered, 0);
        assert_eq!(cmd2.outbound_missing, 4);
        assert_eq!(cmd2.last_delivery, None);
        let stray = rows.iter().find(|r| r.model == "Stray").unwrap();
        assert_eq!(stray.quantity_total, 0);
        assert_eq!(stray.outbound_missing, -3);
        assert!(stray.flagged);
    }

    #[test]
    fn totals_count_open_orders() {
        let rows = planning_rows(&scenario(), &PlanningFilter::default());
        let t = totals(&rows);
        assert_eq!(t.orders, 1);
        assert_eq!(t.open_orders, 1);
        assert_eq!(t.quantity_delivered, 15);
    }

    #[test]
    fn split_commandes_drops_blanks_and_duplicates() {
        assert_eq!(
            split_commandes(" A1, ,a1,B2 ,"),
            vec!["A1".to_string(), "B2".to_string()]
        );
    }
}
