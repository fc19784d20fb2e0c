use super::ui;
use crate::core::conversion::Report;
use chrono::{DateTime, FixedOffset};
use comfy_table::Cell;

impl Report {
    pub fn display_as_table(&self, as_of: Option<DateTime<FixedOffset>>) -> String {
        let mut balances = ui::new_styled_table();
        balances.set_header(vec![ui::header_cell("Currency"), ui::header_cell("Balance")]);
        for (currency, amount) in &self.balances {
            balances.add_row(vec![
                Cell::new(currency.to_upper()),
                ui::number_cell(format!("{amount}")),
            ]);
        }

        let mut pairs = ui::new_styled_table();
        pairs.set_header(vec![ui::header_cell("Pair"), ui::header_cell("Rate")]);
        for pair in &self.pairs {
            pairs.add_row(vec![
                Cell::new(format!("{}-{}", pair.from, pair.to)),
                ui::rate_cell(pair.rate),
            ]);
        }

        let title = match as_of {
            Some(date) => format!("Balances (rates as of {})", date.format("%Y-%m-%d %H:%M %:z")),
            None => "Balances".to_string(),
        };
        let mut output = format!("{}\n\n", ui::style_text(&title, ui::StyleType::Title));
        output.push_str(&balances.to_string());
        output.push_str("\n\n");
        output.push_str(&pairs.to_string());

        let sums: Vec<String> = self
            .totals
            .iter()
            .map(|(currency, total)| format!("{total:.2} {currency}"))
            .collect();
        output.push_str(&format!(
            "\n\n{} {}",
            ui::style_text("sum:", ui::StyleType::TotalLabel),
            ui::style_text(
                &sums.join(&ui::style_text(" / ", ui::StyleType::Subtle)),
                ui::StyleType::TotalValue
            )
        ));

        output
    }
}
