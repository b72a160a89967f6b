use std::fmt;
use std::io::Read;

/// One CSV row as ordered `(column, raw value)` pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub pairs: Vec<(String, String)>,
}

impl Record {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == column)
            .map(|(_, v)| v.as_str())
    }

    /// Numeric value of `column`. Empty, unparseable, and non-finite cells are missing.
    pub fn number(&self, column: &str) -> Option<f64> {
        parse_number(self.get(column)?)
    }
}

pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// A delimited text table with a header row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub records: Vec<Record>,
}

#[derive(Debug)]
pub enum TableError {
    Csv(csv::Error),
    MissingHeader,
    DuplicateHeader(String),
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::Csv(e) => write!(f, "CSV error: {e}"),
            TableError::MissingHeader => write!(f, "CSV has no header row"),
            TableError::DuplicateHeader(h) => write!(f, "duplicate CSV column: {h}"),
        }
    }
}

impl std::error::Error for TableError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TableError::Csv(e) => Some(e),
            _ => None,
        }
    }
}

impl From<csv::Error> for TableError {
    fn from(e: csv::Error) -> Self {
        TableError::Csv(e)
    }
}

impl Table {
    pub fn from_csv_str(payload: &str) -> Result<Self, TableError> {
        Self::from_csv_reader(payload.as_bytes())
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, TableError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(TableError::MissingHeader);
        }
        for (i, h) in headers.iter().enumerate() {
            if headers[..i].contains(h) {
                return Err(TableError::DuplicateHeader(h.clone()));
            }
        }

        let mut records = Vec::new();
        for result in rdr.records() {
            let row = result?;
            // Trailing blank lines come through as a single empty field.
            if row.len() == 1 && row.get(0).is_some_and(str::is_empty) {
                continue;
            }
            let pairs = headers
                .iter()
                .enumerate()
                .map(|(i, h)| (h.clone(), row.get(i).unwrap_or("").to_string()))
                .collect();
            records.push(Record::new(pairs));
        }

        Ok(Self { headers, records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }
}
