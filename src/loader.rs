use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use polars::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::DashError;
use crate::model::{
    AnimalWelfare, CareDifficulty, DomesticatedSnake, FarmingCountry, Flag, GlobalSnake,
    MediaAppearance, RegulationLevel, Role, UsSnake,
};
use crate::schema::{domesticated, farming, global, media, us, Dataset};

/// Directory holding the five source files.
#[derive(Debug, Clone)]
pub struct DataSource {
    root: PathBuf,
}

impl DataSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_of(&self, dataset: Dataset) -> PathBuf {
        self.root.join(dataset.file_name())
    }

    pub fn load_us_snakes(&self) -> Result<Vec<UsSnake>, DashError> {
        self.load(Dataset::UsSnakes, |c, i| {
            Ok(UsSnake {
                states: c.text(i, us::STATES),
                common_name: c.text(i, us::COMMON_NAME),
                lethality_score: c.number(i, us::LETHALITY_SCORE)?,
                venomous: c.category(i, us::VENOMOUS)?,
                venom_type: c.text(i, us::VENOM_TYPE),
                avg_length_cm: c.number(i, us::AVG_LENGTH_CM)?,
                max_length_cm: c.number(i, us::MAX_LENGTH_CM)?,
                conservation_status: c.text(i, us::CONSERVATION_STATUS),
                invasive: c.category(i, us::INVASIVE)?,
            })
        })
    }

    pub fn load_global_snakes(&self) -> Result<Vec<GlobalSnake>, DashError> {
        self.load(Dataset::GlobalSnakes, |c, i| {
            Ok(GlobalSnake {
                continent: c.text(i, global::CONTINENT),
                species_name: c.text(i, global::SPECIES_NAME),
                common_name: c.text(i, global::COMMON_NAME),
                lethality_score: c.number(i, global::LETHALITY_SCORE)?,
                avg_length_cm: c.number(i, global::AVG_LENGTH_CM)?,
                max_length_cm: c.number(i, global::MAX_LENGTH_CM)?,
                venomous: c.category(i, global::VENOMOUS)?,
                venom_type: c.text(i, global::VENOM_TYPE),
                conservation_status: c.text(i, global::CONSERVATION_STATUS),
            })
        })
    }

    pub fn load_domesticated(&self) -> Result<Vec<DomesticatedSnake>, DashError> {
        self.load(Dataset::Domesticated, |c, i| {
            Ok(DomesticatedSnake {
                common_name: c.text(i, domesticated::COMMON_NAME),
                popularity_score: c.number(i, domesticated::POPULARITY_SCORE)?,
                avg_cost_usd: c.number(i, domesticated::AVG_COST_USD)?,
                avg_lifespan_years: c.number(i, domesticated::AVG_LIFESPAN_YEARS)?,
                care_difficulty: c.category::<CareDifficulty>(i, domesticated::CARE_DIFFICULTY)?,
                temperament: c.text(i, domesticated::TEMPERAMENT),
                domestication_level: c.text(i, domesticated::DOMESTICATION_LEVEL),
                first_domesticated_era: c.text(i, domesticated::FIRST_DOMESTICATED_ERA),
                origin: c.text(i, domesticated::ORIGIN),
                reasons_for_domestication: c.text(i, domesticated::REASONS_FOR_DOMESTICATION),
            })
        })
    }

    pub fn load_media(&self) -> Result<Vec<MediaAppearance>, DashError> {
        self.load(Dataset::Media, |c, i| {
            Ok(MediaAppearance {
                title: c.text(i, media::TITLE),
                media_type: c.text(i, media::MEDIA_TYPE),
                year: c.lenient_number(i, media::YEAR).map(|y| y.round() as i32),
                snake_character: c.text(i, media::SNAKE_CHARACTER),
                role: c.text(i, media::ROLE),
                protagonist_antagonist: Role::parse_optional(
                    c.raw(i, media::PROTAGONIST_ANTAGONIST),
                )?,
                cultural_impact: c.text(i, media::CULTURAL_IMPACT),
                accuracy_rating: c.lenient_number(i, media::ACCURACY_RATING),
            })
        })
    }

    pub fn load_farming(&self) -> Result<Vec<FarmingCountry>, DashError> {
        self.load(Dataset::Farming, |c, i| {
            Ok(FarmingCountry {
                country: c.text(i, farming::COUNTRY),
                primary_species_farmed: c.text(i, farming::PRIMARY_SPECIES_FARMED),
                farming_method: c.text(i, farming::FARMING_METHOD),
                annual_production_skins: c.count(i, farming::ANNUAL_PRODUCTION_SKINS)?,
                ethical_score: c.number(i, farming::ETHICAL_SCORE)?,
                animal_welfare_rating: AnimalWelfare::parse(c.raw(i, farming::ANIMAL_WELFARE_RATING)),
                sustainability_rating: c.text(i, farming::SUSTAINABILITY_RATING),
                regulation_level: c.category::<RegulationLevel>(i, farming::REGULATION_LEVEL)?,
                certification_available: c.category::<Flag>(i, farming::CERTIFICATION_AVAILABLE)?,
                conservation_impact: c.text(i, farming::CONSERVATION_IMPACT),
                common_issues: c.text(i, farming::COMMON_ISSUES),
                best_practices: c.text(i, farming::BEST_PRACTICES),
            })
        })
    }

    /// Check that every source file exists and parses, without failing fast.
    pub fn verify_sources(&self) -> Vec<SourceCheck> {
        Dataset::ALL
            .into_iter()
            .map(|dataset| {
                let path = self.path_of(dataset);
                let bytes = fs::metadata(&path).ok().map(|m| m.len());
                let records = self.count_records(dataset).map_err(|e| e.to_string());
                SourceCheck {
                    dataset,
                    path,
                    bytes,
                    records,
                }
            })
            .collect()
    }

    fn count_records(&self, dataset: Dataset) -> Result<usize, DashError> {
        Ok(match dataset {
            Dataset::UsSnakes => self.load_us_snakes()?.len(),
            Dataset::GlobalSnakes => self.load_global_snakes()?.len(),
            Dataset::Domesticated => self.load_domesticated()?.len(),
            Dataset::Media => self.load_media()?.len(),
            Dataset::Farming => self.load_farming()?.len(),
        })
    }

    fn load<T>(
        &self,
        dataset: Dataset,
        build: impl Fn(&Cells<'_>, usize) -> Result<T, DashError>,
    ) -> Result<Vec<T>, DashError> {
        let df = self.read_csv_as_strings(dataset)?;
        let cells = Cells::new(&df, dataset)?;
        let records = (0..df.height())
            .map(|i| build(&cells, i))
            .collect::<Result<Vec<T>, DashError>>()?;
        info!(dataset = %dataset, records = records.len(), "dataset loaded");
        Ok(records)
    }

    /// Read a CSV with every column as a string, names trimmed and values
    /// stripped of surrounding whitespace.
    fn read_csv_as_strings(&self, dataset: Dataset) -> Result<DataFrame, DashError> {
        let path = self.path_of(dataset);
        if !path.is_file() {
            warn!(path = %path.display(), "data file missing");
            return Err(DashError::MissingFile(path));
        }
        let file = fs::File::open(&path)?;
        let mut df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0)) // all columns as String
            .into_reader_with_file_handle(file)
            .finish()?;

        let trimmed: Vec<String> = df
            .get_column_names_str()
            .iter()
            .map(|c| c.trim().to_string())
            .collect();
        df.set_column_names(trimmed.as_slice())?;

        require_columns(&df, dataset)?;

        let stripped: Vec<Expr> = dataset
            .required_columns()
            .iter()
            .map(|&name| col(name).str().strip_chars(lit(" \t\r\n")))
            .collect();
        Ok(df.lazy().with_columns(stripped).collect()?)
    }
}

fn require_columns(df: &DataFrame, dataset: Dataset) -> Result<(), DashError> {
    for &col_name in dataset.required_columns() {
        if df.column(col_name).is_err() {
            return Err(DashError::MissingColumn {
                dataset,
                column: col_name.to_string(),
            });
        }
    }
    Ok(())
}

/// Typed access to the string cells of one loaded table.
struct Cells<'a> {
    dataset: Dataset,
    columns: HashMap<&'static str, &'a StringChunked>,
}

impl<'a> Cells<'a> {
    fn new(df: &'a DataFrame, dataset: Dataset) -> Result<Self, DashError> {
        let mut columns = HashMap::new();
        for &name in dataset.required_columns() {
            columns.insert(name, df.column(name)?.str()?);
        }
        Ok(Self { dataset, columns })
    }

    /// Empty cells come back from polars as nulls; both read as "".
    fn raw(&self, row: usize, column: &'static str) -> &'a str {
        self.columns
            .get(column)
            .copied()
            .and_then(|c| c.get(row))
            .unwrap_or("")
    }

    fn text(&self, row: usize, column: &'static str) -> String {
        self.raw(row, column).to_string()
    }

    fn invalid(&self, row: usize, column: &'static str) -> DashError {
        DashError::InvalidData {
            dataset: self.dataset,
            row,
            column: column.to_string(),
            value: self.text(row, column),
        }
    }

    /// Required finite number.
    fn number(&self, row: usize, column: &'static str) -> Result<f64, DashError> {
        self.raw(row, column)
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| self.invalid(row, column))
    }

    /// Required non-negative whole number.
    fn count(&self, row: usize, column: &'static str) -> Result<u64, DashError> {
        self.raw(row, column)
            .parse::<u64>()
            .map_err(|_| self.invalid(row, column))
    }

    /// Optional number; blank, "N/A" and anything unparseable read as `None`.
    fn lenient_number(&self, row: usize, column: &'static str) -> Option<f64> {
        let value = self.raw(row, column);
        if value.is_empty() || value.eq_ignore_ascii_case("N/A") {
            return None;
        }
        match value.parse::<f64>() {
            Ok(v) if v.is_finite() => Some(v),
            _ => {
                debug!(dataset = %self.dataset, row, column, value, "non-numeric value skipped");
                None
            }
        }
    }

    fn category<T: FromStr<Err = DashError>>(
        &self,
        row: usize,
        column: &'static str,
    ) -> Result<T, DashError> {
        self.raw(row, column).parse::<T>()
    }
}

/// Outcome of checking one source file.
#[derive(Debug, Clone, Serialize)]
pub struct SourceCheck {
    pub dataset: Dataset,
    pub path: PathBuf,
    /// File size, `None` when the file is missing.
    pub bytes: Option<u64>,
    pub records: Result<usize, String>,
}

impl SourceCheck {
    pub fn is_ok(&self) -> bool {
        self.records.is_ok()
    }
}

/// Species whose state list contains `code` exactly.
pub fn snakes_in_state(rows: &[UsSnake], code: &str) -> Vec<UsSnake> {
    let code = code.trim();
    rows.iter()
        .filter(|r| r.states.split(',').any(|s| s.trim() == code))
        .cloned()
        .collect()
}

pub fn snakes_by_continent(rows: &[GlobalSnake], continent: &str) -> Vec<GlobalSnake> {
    rows.iter()
        .filter(|r| r.continent == continent)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use tempfile::TempDir;

    fn write(dir: &TempDir, dataset: Dataset, body: &str) {
        let mut f = fs::File::create(dir.path().join(dataset.file_name())).unwrap();
        f.write_all(body.as_bytes()).unwrap();
    }

    const US_HEADER: &str = "states,common_name,lethality_score,venomous,venom_type,avg_length_cm,max_length_cm,conservation_status,invasive\n";

    #[test]
    fn loads_us_rows_with_trimmed_headers_and_values() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            Dataset::UsSnakes,
            " states , common_name,lethality_score, venomous ,venom_type,avg_length_cm,max_length_cm,conservation_status,invasive\n\
             \"FL, GA\", Eastern Diamondback ,8,Yes,Hemotoxic,150,240,Least Concern,No\n",
        );
        let rows = DataSource::new(dir.path()).load_us_snakes().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].common_name, "Eastern Diamondback");
        assert_eq!(rows[0].states, "FL, GA");
        assert_eq!(rows[0].venomous, Flag::Yes);
        assert_eq!(rows[0].max_length_cm, 240.0);
    }

    #[test]
    fn missing_file_is_reported_with_path() {
        let dir = TempDir::new().unwrap();
        let err = DataSource::new(dir.path()).load_farming().unwrap_err();
        match err {
            DashError::MissingFile(path) => assert!(path.ends_with("snakeskin_farming.csv")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_column_names_the_column() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            Dataset::UsSnakes,
            "states,common_name\nFL,Garter Snake\n",
        );
        let err = DataSource::new(dir.path()).load_us_snakes().unwrap_err();
        assert!(matches!(
            err,
            DashError::MissingColumn { ref column, .. } if column == us::LETHALITY_SCORE
        ));
    }

    #[test]
    fn malformed_flag_is_rejected() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            Dataset::UsSnakes,
            &format!("{US_HEADER}TX,Coral Snake,7,Maybe,Neurotoxic,60,120,Least Concern,No\n"),
        );
        let err = DataSource::new(dir.path()).load_us_snakes().unwrap_err();
        assert!(matches!(err, DashError::UnknownCategory { kind: "flag", .. }));
        assert!(err.is_load_failure());
    }

    #[test]
    fn malformed_required_number_reports_row_and_column() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            Dataset::UsSnakes,
            &format!(
                "{US_HEADER}TX,Coral Snake,7,Yes,Neurotoxic,60,120,Least Concern,No\n\
                 AZ,Mojave Rattlesnake,high,Yes,Neurotoxic,90,130,Least Concern,No\n"
            ),
        );
        let err = DataSource::new(dir.path()).load_us_snakes().unwrap_err();
        match err {
            DashError::InvalidData {
                row, column, value, ..
            } => {
                assert_eq!(row, 1);
                assert_eq!(column, us::LETHALITY_SCORE);
                assert_eq!(value, "high");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn lenient_media_columns_read_as_none() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            Dataset::Media,
            "title,media_type,year,snake_character,role,protagonist_antagonist,cultural_impact,accuracy_rating\n\
             Norse Myth,Mythology,Ancient,Jormungandr,World Serpent,N/A,Very High,N/A\n\
             The Jungle Book,Film,1967,Kaa,Python,Antagonist,High,3\n\
             Snakes on a Plane,Film,2006,Various,Attackers,Antagonist,Medium,unknown\n",
        );
        let rows = DataSource::new(dir.path()).load_media().unwrap();
        assert_eq!(rows[0].year, None);
        assert_eq!(rows[0].protagonist_antagonist, None);
        assert_eq!(rows[0].accuracy_rating, None);
        assert_eq!(rows[1].year, Some(1967));
        assert_eq!(rows[1].accuracy_rating, Some(3.0));
        assert_eq!(rows[2].accuracy_rating, None);
    }

    #[test]
    fn verify_sources_reports_every_dataset() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            Dataset::UsSnakes,
            &format!("{US_HEADER}FL,Garter Snake,0,No,None,60,120,Least Concern,No\n"),
        );
        let checks = DataSource::new(dir.path()).verify_sources();
        assert_eq!(checks.len(), Dataset::ALL.len());
        assert!(checks[0].is_ok());
        assert_eq!(checks[0].records, Ok(1));
        assert!(checks[0].bytes.unwrap_or(0) > 0);
        assert!(checks[1..].iter().all(|c| !c.is_ok() && c.bytes.is_none()));
    }

    #[test]
    fn state_filter_matches_whole_codes() {
        let snake = |states: &str, name: &str| UsSnake {
            states: states.to_string(),
            common_name: name.to_string(),
            lethality_score: 1.0,
            venomous: Flag::No,
            venom_type: "None".to_string(),
            avg_length_cm: 50.0,
            max_length_cm: 90.0,
            conservation_status: "Least Concern".to_string(),
            invasive: Flag::No,
        };
        let rows = vec![snake("AL, GA", "a"), snake("LA", "b"), snake("GA", "c")];
        let names: Vec<_> = snakes_in_state(&rows, "GA")
            .into_iter()
            .map(|r| r.common_name)
            .collect();
        assert_eq!(names, vec!["a", "c"]);
        assert!(snakes_in_state(&rows, "A").is_empty());
    }
}
