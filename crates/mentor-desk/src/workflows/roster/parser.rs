use super::domain::{ImportCandidate, RosterKind, StudentDetails};
use super::normalizer::{is_valid_email, normalize_email, present};
use super::RosterImportError;
use std::io::Read;

/// Header names a student roster must carry, in template order.
pub const STUDENT_COLUMNS: [&str; 7] = [
    "email",
    "name",
    "phone",
    "department",
    "year",
    "division",
    "rollno",
];

/// Candidates extracted from one upload plus how many rows or cells were dropped as invalid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRoster {
    pub candidates: Vec<ImportCandidate>,
    pub skipped: usize,
}

pub fn parse_roster<R: Read>(
    reader: R,
    kind: RosterKind,
) -> Result<ParsedRoster, RosterImportError> {
    match kind {
        RosterKind::Teacher => parse_teachers(reader),
        RosterKind::Student => parse_students(reader),
    }
}

/// Every non-empty cell is an address; a header row is optional and falls out as invalid.
fn parse_teachers<R: Read>(reader: R) -> Result<ParsedRoster, RosterImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut parsed = ParsedRoster::default();

    for record in csv_reader.records() {
        let record = record?;
        for cell in record.iter() {
            let email = normalize_email(cell);
            if email.is_empty() {
                continue;
            }

            if is_valid_email(&email) {
                parsed.candidates.push(ImportCandidate::Teacher { email });
            } else {
                parsed.skipped += 1;
            }
        }
    }

    Ok(parsed)
}

fn parse_students<R: Read>(reader: R) -> Result<ParsedRoster, RosterImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    if headers.iter().all(|header| header.trim().is_empty()) {
        return Ok(ParsedRoster::default());
    }

    let columns = StudentColumns::locate(&headers)?;
    let mut parsed = ParsedRoster::default();

    for record in csv_reader.records() {
        let record = record?;
        match columns.details(&record) {
            Some(details) => parsed.candidates.push(ImportCandidate::Student(details)),
            None => parsed.skipped += 1,
        }
    }

    Ok(parsed)
}

/// Column positions of the required student fields, in `STUDENT_COLUMNS` order.
struct StudentColumns([usize; 7]);

impl StudentColumns {
    fn locate(headers: &csv::StringRecord) -> Result<Self, RosterImportError> {
        let normalized: Vec<String> = headers
            .iter()
            .map(|header| header.replace('\u{feff}', "").trim().to_ascii_lowercase())
            .collect();

        let mut positions = [0usize; 7];
        let mut missing = Vec::new();
        for (slot, column) in STUDENT_COLUMNS.iter().enumerate() {
            match normalized.iter().position(|header| header == column) {
                Some(index) => positions[slot] = index,
                None => missing.push(*column),
            }
        }

        if missing.is_empty() {
            Ok(Self(positions))
        } else {
            Err(RosterImportError::MissingColumns { missing })
        }
    }

    fn details(&self, record: &csv::StringRecord) -> Option<StudentDetails> {
        let [email, name, phone, department, year, division, roll_number] =
            self.0.map(|index| present(record.get(index)));

        let email = normalize_email(&email?);
        if !is_valid_email(&email) {
            return None;
        }

        Some(StudentDetails {
            email,
            name: name?,
            phone: phone?,
            department: department?,
            year: year?,
            division: division?,
            roll_number: roll_number?,
        })
    }
}
