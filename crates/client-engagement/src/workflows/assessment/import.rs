use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::domain::{RecommendationInput, RecommendationOutput};
use super::intake::{normalize, IntakeForm, ValidationErrors};
use super::scoring::score;

#[derive(Debug)]
pub enum IntakeImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for IntakeImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntakeImportError::Io(err) => write!(f, "failed to read intake export: {}", err),
            IntakeImportError::Csv(err) => write!(f, "invalid intake CSV data: {}", err),
        }
    }
}

impl std::error::Error for IntakeImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IntakeImportError::Io(err) => Some(err),
            IntakeImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for IntakeImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for IntakeImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Scored result for one CSV row. `row` is 1-based, excluding the header.
#[derive(Debug, Clone)]
pub struct BatchRecommendation {
    pub row: usize,
    pub result: Result<(RecommendationInput, RecommendationOutput), ValidationErrors>,
}

/// Reads exported Tier 1 answers and scores each row independently.
pub struct IntakeBatch;

impl IntakeBatch {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<BatchRecommendation>, IntakeImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<BatchRecommendation>, IntakeImportError> {
        let forms = parse_forms(reader)?;

        Ok(forms
            .iter()
            .enumerate()
            .map(|(index, form)| BatchRecommendation {
                row: index + 1,
                result: normalize(form).map(|input| {
                    let output = score(&input);
                    (input, output)
                }),
            })
            .collect())
    }
}

fn parse_forms<R: Read>(reader: R) -> Result<Vec<IntakeForm>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut forms = Vec::new();

    for record in csv_reader.deserialize::<IntakeRow>() {
        let row = record?;
        forms.push(row.into_form());
    }

    Ok(forms)
}

#[derive(Debug, Deserialize)]
struct IntakeRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    current_state: Option<String>,
    #[serde(default)]
    needs: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    website_scope: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    marketing_timing: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    budget_range: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    timeline_expectation: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    target_date: Option<String>,
}

impl IntakeRow {
    fn into_form(self) -> IntakeForm {
        IntakeForm {
            current_state: self.current_state,
            needs: self
                .needs
                .split(';')
                .map(str::trim)
                .filter(|need| !need.is_empty())
                .map(str::to_string)
                .collect(),
            website_scope: self.website_scope,
            marketing_timing: self.marketing_timing,
            budget_range: self.budget_range,
            timeline_expectation: self.timeline_expectation,
            target_date: self.target_date,
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
