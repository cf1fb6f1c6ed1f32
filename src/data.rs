use std::fs::File;
use std::io::ErrorKind;
use std::num::ParseFloatError;
use std::path::Path;

use csv::StringRecord;
use tracing::info;

use crate::error::{ColumnError, LoadError};

/// Logical name of each dataset the dashboard reads at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableId {
    Hospital,
    CountyLevel,
    Population,
    Revenue,
}

impl TableId {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Hospital => "hospital",
            Self::CountyLevel => "county_level",
            Self::Population => "population",
            Self::Revenue => "revenue",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Hospital => "hospital.csv",
            Self::CountyLevel => "county_level.csv",
            Self::Population => "population.csv",
            Self::Revenue => "revenue.csv",
        }
    }

    pub fn all() -> &'static [TableId] {
        &[
            TableId::Hospital,
            TableId::CountyLevel,
            TableId::Population,
            TableId::Revenue,
        ]
    }
}

/// A header row plus raw string rows, exactly as read from disk.
#[derive(Debug, Clone)]
pub struct Table {
    id: TableId,
    headers: StringRecord,
    rows: Vec<StringRecord>,
}

impl Table {
    /// Read one CSV file. No column checks happen here.
    pub fn read(id: TableId, path: &Path) -> Result<Self, LoadError> {
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => LoadError::NotFound {
                table: id.name(),
                path: path.to_path_buf(),
            },
            _ => LoadError::Io {
                table: id.name(),
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        let parse_err = |source: csv::Error| LoadError::Parse {
            table: id.name(),
            path: path.to_path_buf(),
            source,
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let headers = reader.headers().map_err(parse_err)?.clone();
        if headers.is_empty() || headers.iter().all(str::is_empty) {
            return Err(LoadError::MissingHeader {
                table: id.name(),
                path: path.to_path_buf(),
            });
        }

        let rows = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(parse_err)?;

        Ok(Self { id, headers, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    fn position(&self, column: &'static str) -> Result<usize, ColumnError> {
        self.headers
            .iter()
            .position(|h| h == column)
            .ok_or(ColumnError::Missing {
                table: self.id.name(),
                column,
            })
    }

    fn cells(&self, column: &'static str) -> Result<impl Iterator<Item = &str> + '_, ColumnError> {
        let index = self.position(column)?;
        Ok(self.rows.iter().map(move |row| row.get(index).unwrap_or("")))
    }

    /// Decode one numeric column. Blank cells and missing-value markers
    /// become `None`; any other unparseable cell fails the column.
    pub fn numeric_column(&self, column: &'static str) -> Result<Vec<Option<f64>>, ColumnError> {
        self.cells(column)?
            .enumerate()
            .map(|(i, cell)| {
                parse_number(cell).map_err(|e| ColumnError::InvalidValue {
                    table: self.id.name(),
                    row: i + 1,
                    column,
                    message: format!("{cell:?}: {e}"),
                })
            })
            .collect()
    }

    /// Decode one label column. Never fails once the column exists.
    pub fn text_column(&self, column: &'static str) -> Result<Vec<Option<String>>, ColumnError> {
        Ok(self
            .cells(column)?
            .map(|cell| (!is_missing(cell)).then(|| cell.to_string()))
            .collect())
    }
}

/// Cell text read as "no value", on top of the empty cell.
const MISSING_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_missing(cell: &str) -> bool {
    let cell = cell.trim();
    cell.is_empty() || MISSING_MARKERS.contains(&cell)
}

pub fn parse_number(cell: &str) -> Result<Option<f64>, ParseFloatError> {
    if is_missing(cell) {
        return Ok(None);
    }
    cell.trim().parse().map(Some)
}

/// The four tables, loaded once at startup and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Datasets {
    pub hospital: Table,
    pub county_level: Table,
    pub population: Table,
    pub revenue: Table,
}

impl Datasets {
    pub fn load(dir: &Path) -> Result<Self, LoadError> {
        let read = |id: TableId| -> Result<Table, LoadError> {
            let table = Table::read(id, &dir.join(id.file_name()))?;
            info!(
                table = id.name(),
                rows = table.len(),
                columns = table.column_count(),
                "loaded table"
            );
            Ok(table)
        };

        Ok(Self {
            hospital: read(TableId::Hospital)?,
            county_level: read(TableId::CountyLevel)?,
            population: read(TableId::Population)?,
            revenue: read(TableId::Revenue)?,
        })
    }

    pub fn table(&self, id: TableId) -> &Table {
        match id {
            TableId::Hospital => &self.hospital,
            TableId::CountyLevel => &self.county_level,
            TableId::Population => &self.population,
            TableId::Revenue => &self.revenue,
        }
    }
}

// ========== Typed rows ==========

/// A hospital row as the capital-expenditure panel sees it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FacilityRecord {
    pub capital_expenditure: Option<f64>,
    pub net_revenue: Option<f64>,
}

/// A county row as the revenue ranking sees it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CountyAggregate {
    pub name: String,
    pub revenue: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) {
        fs::write(dir.path().join(name), contents).unwrap();
    }

    fn write_all(dir: &TempDir) {
        write(
            dir,
            "hospital.csv",
            "FAC_NAME,AVL_BEDS,GRIP_TOT,TOT_OP_EXP,NET_TOT,CAP_EXP\n\
             Alpha,10,1000000,800000,200000,5000000\n\
             Beta,25,,900000,-50000,\n",
        );
        write(
            dir,
            "county_level.csv",
            "COUNTY_NAME,REVENUE,AVL_BEDS_PER_THOUSAND\nAlameda,500,2.1\n",
        );
        write(dir, "population.csv", "POPULATION\n1000\n2500\n");
        write(dir, "revenue.csv", "YEAR,TOTAL\n2020,12\n");
    }

    #[test]
    fn test_load_all_tables() {
        let dir = TempDir::new().unwrap();
        write_all(&dir);

        let data = Datasets::load(dir.path()).unwrap();
        assert_eq!(data.hospital.len(), 2);
        assert_eq!(data.county_level.len(), 1);
        assert_eq!(data.population.len(), 2);
        assert_eq!(data.revenue.len(), 1);
        assert_eq!(data.table(TableId::Revenue).column_count(), 2);
        assert!(data.hospital.has_column("CAP_EXP"));
        assert!(!data.hospital.has_column("COUNTY_NAME"));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        write_all(&dir);
        fs::remove_file(dir.path().join("revenue.csv")).unwrap();

        let err = Datasets::load(dir.path()).unwrap_err();
        assert!(matches!(err, LoadError::NotFound { table: "revenue", .. }));
    }

    #[test]
    fn test_ragged_rows_are_parse_errors() {
        let dir = TempDir::new().unwrap();
        write_all(&dir);
        write(&dir, "population.csv", "POPULATION\n1000,7\n");

        let err = Datasets::load(dir.path()).unwrap_err();
        assert!(matches!(err, LoadError::Parse { table: "population", .. }));
    }

    #[test]
    fn test_empty_file_has_no_header() {
        let dir = TempDir::new().unwrap();
        write_all(&dir);
        write(&dir, "county_level.csv", "");

        let err = Datasets::load(dir.path()).unwrap_err();
        assert!(matches!(err, LoadError::MissingHeader { table: "county_level", .. }));
    }

    #[test]
    fn test_numeric_column_with_blanks() {
        let dir = TempDir::new().unwrap();
        write_all(&dir);
        let data = Datasets::load(dir.path()).unwrap();

        assert_eq!(
            data.hospital.numeric_column("GRIP_TOT").unwrap(),
            [Some(1_000_000.0), None]
        );
        assert_eq!(
            data.hospital.numeric_column("NET_TOT").unwrap(),
            [Some(200_000.0), Some(-50_000.0)]
        );
        assert_eq!(
            data.hospital.text_column("FAC_NAME").unwrap(),
            [Some("Alpha".to_string()), Some("Beta".to_string())]
        );
    }

    #[test]
    fn test_missing_markers_decode_as_none() {
        for marker in ["NA", "N/A", "n/a", "NULL", "null", "#N/A", "-NaN", "nan", "<NA>"] {
            assert_eq!(parse_number(marker), Ok(None), "marker {marker}");
        }
        assert_eq!(parse_number(" 42 "), Ok(Some(42.0)));
        assert!(parse_number("lots").is_err());

        let dir = TempDir::new().unwrap();
        write_all(&dir);
        write(&dir, "county_level.csv", "COUNTY_NAME,REVENUE\nNA,NULL\nKern,#N/A\n");
        let data = Datasets::load(dir.path()).unwrap();
        assert_eq!(data.county_level.numeric_column("REVENUE").unwrap(), [None, None]);
        assert_eq!(
            data.county_level.text_column("COUNTY_NAME").unwrap(),
            [None, Some("Kern".to_string())]
        );
    }

    #[test]
    fn test_bad_numeric_cell_names_row_and_column() {
        let dir = TempDir::new().unwrap();
        write_all(&dir);
        write(&dir, "population.csv", "POPULATION\n1000\nlots\n");
        let data = Datasets::load(dir.path()).unwrap();

        match data.population.numeric_column("POPULATION").unwrap_err() {
            ColumnError::InvalidValue { table, row, column, message } => {
                assert_eq!(table, "population");
                assert_eq!(row, 2);
                assert_eq!(column, "POPULATION");
                assert!(message.contains("\"lots\""));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_bad_cell_fails_only_its_column() {
        let dir = TempDir::new().unwrap();
        write_all(&dir);
        write(
            &dir,
            "hospital.csv",
            "FAC_NAME,AVL_BEDS,GRIP_TOT,TOT_OP_EXP,NET_TOT,CAP_EXP\nA,1,oops,1,200,5000000\n",
        );
        let data = Datasets::load(dir.path()).unwrap();

        assert!(data.hospital.numeric_column("GRIP_TOT").is_err());
        assert_eq!(data.hospital.numeric_column("CAP_EXP").unwrap(), [Some(5_000_000.0)]);
    }

    #[test]
    fn test_absent_column_is_missing() {
        let dir = TempDir::new().unwrap();
        write_all(&dir);
        write(&dir, "county_level.csv", "COUNTY_NAME,REVENUE\nKern,42\n");
        let data = Datasets::load(dir.path()).unwrap();

        assert_eq!(data.county_level.numeric_column("REVENUE").unwrap(), [Some(42.0)]);
        assert_eq!(
            data.county_level.numeric_column("AVL_BEDS_PER_THOUSAND"),
            Err(ColumnError::Missing {
                table: "county_level",
                column: "AVL_BEDS_PER_THOUSAND"
            })
        );
    }
}
