use csv::{ReaderBuilder, StringRecord};
use shared::brazilian_format;
use shared::models::PriceInput;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::PricingError;
use crate::models::BatchItem;

pub struct BrazilianCsvParser;

impl BrazilianCsvParser {
    // CSV Header: Produto;Custo;Margem;Imposto;Taxa Cartao;Frete;Outros Custos;Incluir Frete
    // Example Row: Caneca 350ml;1.234,56;20;6,5;4,99;15,00;0;sim
    // Produto, Custo and Margem are required; the rest default to zero (Incluir Frete to "sim").
    pub fn load_batch_from_csv(file_path: impl AsRef<Path>, delimiter: u8) -> Result<Vec<BatchItem>, PricingError> {
        let file = File::open(file_path.as_ref())?;
        Self::load_batch_from_reader(BufReader::new(file), delimiter)
    }

    pub fn load_batch_from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Vec<BatchItem>, PricingError> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        for required in ["Produto", "Custo", "Margem"] {
            if !headers.iter().any(|h| h == required) {
                return Err(PricingError::CsvDataFormatError(format!("Missing '{}' column in header", required)));
            }
        }

        let mut items = Vec::new();
        for (idx, result) in rdr.records().enumerate() {
            let record = result?;
            let line = idx + 2;

            let product = Self::get_field(&record, &headers, "Produto")
                .filter(|p| !p.is_empty())
                .ok_or_else(|| PricingError::CsvDataFormatError(format!("Missing 'Produto' field at line {}", line)))?;

            let input = PriceInput {
                cost: Self::required_number(&record, &headers, "Custo", line)?,
                target_margin_percent: Self::required_number(&record, &headers, "Margem", line)?,
                tax_percent: Self::optional_number(&record, &headers, "Imposto", line)?,
                card_fee_percent: Self::optional_number(&record, &headers, "Taxa Cartao", line)?,
                shipping: Self::optional_number(&record, &headers, "Frete", line)?,
                other_costs: Self::optional_number(&record, &headers, "Outros Custos", line)?,
                include_shipping: Self::flag(&record, &headers, "Incluir Frete", line)?,
            };

            items.push(BatchItem { line, product: product.to_string(), input });
        }

        tracing::debug!(items = items.len(), "Loaded batch pricing rows");
        Ok(items)
    }

    fn required_number(record: &StringRecord, headers: &StringRecord, name: &str, line: usize) -> Result<f64, PricingError> {
        let raw = Self::get_field(record, headers, name)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| PricingError::CsvDataFormatError(format!("Missing '{}' field at line {}", name, line)))?;
        Self::number(raw, name, line)
    }

    fn optional_number(record: &StringRecord, headers: &StringRecord, name: &str, line: usize) -> Result<f64, PricingError> {
        match Self::get_field(record, headers, name).filter(|v| !v.is_empty()) {
            Some(raw) => Self::number(raw, name, line),
            None => Ok(0.0),
        }
    }

    fn number(raw: &str, name: &str, line: usize) -> Result<f64, PricingError> {
        brazilian_format::try_parse_decimal(raw)
            .map_err(|e| PricingError::CsvDataFormatError(format!("Error parsing '{}' at line {}: {}", name, line, e)))
    }

    fn flag(record: &StringRecord, headers: &StringRecord, name: &str, line: usize) -> Result<bool, PricingError> {
        let raw = match Self::get_field(record, headers, name).filter(|v| !v.is_empty()) {
            Some(raw) => raw.to_lowercase(),
            None => return Ok(true),
        };
        match raw.as_str() {
            "sim" | "s" | "true" | "1" | "yes" => Ok(true),
            "nao" | "não" | "n" | "false" | "0" | "no" => Ok(false),
            _ => Err(PricingError::CsvDataFormatError(format!(
                "Error parsing '{}' at line {}: expected sim/nao, got '{}'",
                name, line, raw
            ))),
        }
    }

    // Looks a field up by header name so column order does not matter.
    fn get_field<'a>(record: &'a StringRecord, headers: &StringRecord, name: &str) -> Option<&'a str> {
        headers.iter().position(|header| header == name).and_then(|pos| record.get(pos))
    }
}
