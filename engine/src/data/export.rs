// Spreadsheet-friendly CSV exports of pricing results, formatted for
// Brazilian locale readers.
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use shared::brazilian_format::{format_currency, format_decimal, format_percent};
use shared::models::{ComparisonResult, ScenarioComparison};
use std::io::Write;

use crate::error::PricingError;
use crate::models::BatchOutcome;

#[derive(Debug, Clone, PartialEq)]
pub struct ExportMetadata {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub delimiter: u8,
}

impl ExportMetadata {
    pub fn new(title: impl Into<String>, generated_at: DateTime<Utc>) -> Self {
        ExportMetadata {
            title: title.into(),
            generated_at,
            delimiter: b';',
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

fn write_preamble<W: Write>(writer: &mut W, metadata: &ExportMetadata) -> Result<(), PricingError> {
    writeln!(
        writer,
        "# {} - gerado em {}",
        metadata.title,
        metadata.generated_at.format("%d/%m/%Y %H:%M:%S")
    )?;
    Ok(())
}

pub fn write_batch<W: Write>(mut writer: W, outcomes: &[BatchOutcome], metadata: &ExportMetadata) -> Result<(), PricingError> {
    write_preamble(&mut writer, metadata)?;
    let mut wtr = WriterBuilder::new().delimiter(metadata.delimiter).from_writer(writer);
    wtr.write_record([
        "Linha", "Produto", "Custo Total", "Preço de Venda", "Impostos", "Taxa Cartão", "Lucro", "Margem Real", "Status",
    ])?;

    for outcome in outcomes {
        let line = outcome.line.to_string();
        match &outcome.result {
            Ok(b) => wtr.write_record([
                line,
                outcome.product.clone(),
                format_currency(b.total_cost),
                format_currency(b.selling_price),
                format_currency(b.tax_amount),
                format_currency(b.card_fee_amount),
                format_currency(b.profit),
                format_percent(b.real_margin_percent, 2),
                "ok".to_string(),
            ])?,
            Err(e) => wtr.write_record([
                line,
                outcome.product.clone(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                e.to_string(),
            ])?,
        }
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_comparison<W: Write>(mut writer: W, comparison: &ComparisonResult, metadata: &ExportMetadata) -> Result<(), PricingError> {
    write_preamble(&mut writer, metadata)?;
    let mut wtr = WriterBuilder::new().delimiter(metadata.delimiter).from_writer(writer);
    wtr.write_record([
        "Posição", "Marketplace", "Preço de Venda", "Taxas Totais", "Lucro", "Diferença de Lucro", "Diferença %", "Recomendado",
    ])?;

    for r in &comparison.results {
        wtr.write_record([
            r.rank.to_string(),
            r.marketplace_name.clone(),
            format_currency(r.breakdown.selling_price),
            format_currency(r.total_fees),
            format_currency(r.profit),
            format_currency(r.profit_difference),
            format_percent(r.profit_difference_percent, 2),
            if r.is_recommended { "sim" } else { "nao" }.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_scenarios<W: Write>(mut writer: W, comparison: &ScenarioComparison, metadata: &ExportMetadata) -> Result<(), PricingError> {
    write_preamble(&mut writer, metadata)?;
    let mut wtr = WriterBuilder::new().delimiter(metadata.delimiter).from_writer(writer);
    wtr.write_record([
        "Cenário", "Preço de Venda", "Lucro", "Margem Real", "Volume Mensal", "Receita Mensal", "Lucro Mensal", "Destaque",
    ])?;

    for r in &comparison.results {
        let highlight = if comparison.best_scenario.as_deref() == Some(r.scenario_id.as_str()) {
            "melhor"
        } else if comparison.worst_scenario.as_deref() == Some(r.scenario_id.as_str()) {
            "pior"
        } else {
            ""
        };
        wtr.write_record([
            r.name.clone(),
            format_currency(r.breakdown.selling_price),
            format_currency(r.breakdown.profit),
            format_percent(r.breakdown.real_margin_percent, 2),
            r.monthly_volume.map(|v| format_decimal(v, 0)).unwrap_or_default(),
            r.monthly_revenue.map(format_currency).unwrap_or_default(),
            r.monthly_profit.map(format_currency).unwrap_or_default(),
            highlight.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator;
    use crate::marketplace;
    use crate::scenarios;
    use chrono::TimeZone;
    use shared::models::{MarketplaceId, PriceInput, RankingMode, ScenarioInput};

    fn metadata() -> ExportMetadata {
        ExportMetadata::new("Relatório", Utc.with_ymd_and_hms(2024, 12, 30, 18, 20, 0).unwrap())
    }

    fn sample_input() -> PriceInput {
        PriceInput {
            cost: 100.0,
            target_margin_percent: 20.0,
            tax_percent: 10.0,
            card_fee_percent: 5.0,
            ..PriceInput::default()
        }
    }

    fn render(write: impl FnOnce(&mut Vec<u8>) -> Result<(), PricingError>) -> String {
        let mut buffer = Vec::new();
        write(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_batch_export_rows() {
        let outcomes = vec![
            BatchOutcome { line: 2, product: "Caneca".to_string(), result: calculator::calculate(&sample_input()) },
            BatchOutcome {
                line: 3,
                product: "Copo".to_string(),
                result: calculator::calculate(&PriceInput { target_margin_percent: 90.0, ..sample_input() }),
            },
        ];
        let output = render(|buf| write_batch(buf, &outcomes, &metadata()));
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "# Relatório - gerado em 30/12/2024 18:20:00");
        assert!(lines[1].starts_with("Linha;Produto;Custo Total"));
        assert_eq!(lines[2], "2;Caneca;R$ 100,00;R$ 153,85;R$ 15,38;R$ 7,69;R$ 30,77;20,00%;ok");
        assert!(lines[3].starts_with("3;Copo;;;;;;;Infeasible pricing"));
    }

    #[test]
    fn test_comparison_export() {
        let comparison = marketplace::compare(
            &sample_input(),
            &[marketplace::profile(MarketplaceId::Amazon), marketplace::profile(MarketplaceId::LojaPropria)],
            RankingMode::LowestFees,
        )
        .unwrap();
        let output = render(|buf| write_comparison(buf, &comparison, &metadata()));
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[2].starts_with("1;Loja Própria;"));
        assert!(lines[2].ends_with(";sim"));
        assert!(lines[3].starts_with("2;Amazon;"));
        assert!(lines[3].ends_with(";nao"));
    }

    #[test]
    fn test_scenario_export_marks_best_and_worst() {
        let scenarios = vec![
            ScenarioInput::new("Base", sample_input()).with_monthly_volume(1000.0),
            ScenarioInput::new("Premium", PriceInput { target_margin_percent: 35.0, ..sample_input() }),
        ];
        let comparison = scenarios::simulate(&scenarios).unwrap();
        let metadata = metadata().with_delimiter(b',');
        let output = render(|buf| write_scenarios(buf, &comparison, &metadata));
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[1], "Cenário,Preço de Venda,Lucro,Margem Real,Volume Mensal,Receita Mensal,Lucro Mensal,Destaque");
        // Brazilian decimals contain commas, so the writer quotes them.
        assert!(lines[2].starts_with("Base,\"R$ 153,85\""));
        assert!(lines[2].contains("1.000"));
        assert!(lines[2].ends_with(",pior"));
        assert!(lines[3].ends_with(",,,,melhor"));
    }
}
