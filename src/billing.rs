//! Monetary totals for invoices and outbound documents.

use crate::entities::{invoice_line, outbound_line};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub trait BillableLine {
    fn quantity(&self) -> i32;
    fn unit_price(&self) -> Decimal;

    /// Excluded lines (repairs, returns) are listed but never billed.
    fn is_excluded(&self) -> bool {
        false
    }

    fn amount(&self) -> Decimal {
        line_amount(self.quantity(), self.unit_price())
    }
}

impl BillableLine for invoice_line::Model {
    fn quantity(&self) -> i32 {
        self.quantity
    }

    fn unit_price(&self) -> Decimal {
        self.unit_price
    }
}

impl BillableLine for outbound_line::Model {
    fn quantity(&self) -> i32 {
        self.quantity_livree
    }

    fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    fn is_excluded(&self) -> bool {
        self.is_excluded
    }
}

pub fn line_amount(quantity: i32, unit_price: Decimal) -> Decimal {
    Decimal::from(quantity) * unit_price
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub struct Totals {
    pub total_ht: Decimal,
    pub total_tva: Decimal,
    pub total_ttc: Decimal,
}

/// HT over billable lines, TVA = HT × rate / 100 only when VAT is active, TTC = HT + TVA.
pub fn compute_totals<'a, L, It>(lines: It, vat_active: bool, vat_rate: Decimal) -> Totals
where
    L: BillableLine + 'a,
    It: IntoIterator<Item = &'a L>,
{
    let total_ht: Decimal = lines
        .into_iter()
        .filter(|line| !line.is_excluded())
        .map(BillableLine::amount)
        .sum();
    let total_tva = if vat_active {
        total_ht * vat_rate / Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };
    Totals {
        total_ht,
        total_tva,
        total_ttc: total_ht + total_tva,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn invoice_line(quantity: i32, unit_price: Decimal) -> invoice_line::Model {
        invoice_line::Model {
            id: 1,
            invoice_id: 1,
            commande: "CMD1".into(),
            model: "ModelX".into(),
            description: None,
            quantity,
            unit_price,
        }
    }

    fn export_line(quantity: i32, unit_price: Decimal, excluded: bool) -> outbound_line::Model {
        outbound_line::Model {
            id: 1,
            document_id: 1,
            client_model_id: None,
            model: "ModelX".into(),
            commande: "CMD1".into(),
            description: None,
            quantity_livree: quantity,
            unit_price,
            is_excluded: excluded,
        }
    }

    #[test]
    fn amount_is_quantity_times_unit_price() {
        assert_eq!(invoice_line(3, dec!(12.50)).amount(), dec!(37.50));
        assert_eq!(line_amount(-2, dec!(4)), dec!(-8));
    }

    #[test]
    fn vat_applies_only_when_active() {
        let lines = vec![invoice_line(10, dec!(5)), invoice_line(2, dec!(25))];

        let with_vat = compute_totals(&lines, true, dec!(19));
        assert_eq!(with_vat.total_ht, dec!(100));
        assert_eq!(with_vat.total_tva, dec!(19));
        assert_eq!(with_vat.total_ttc, dec!(119));

        let without = compute_totals(&lines, false, dec!(19));
        assert_eq!(without.total_tva, Decimal::ZERO);
        assert_eq!(without.total_ttc, without.total_ht);
    }

    #[test]
    fn excluded_export_lines_are_not_billed() {
        let lines = vec![export_line(15, dec!(2), false), export_line(5, dec!(2), true)];
        let totals = compute_totals(&lines, false, Decimal::ZERO);
        assert_eq!(totals.total_ht, dec!(30));
    }
}
