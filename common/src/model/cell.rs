use chrono::{NaiveDateTime, Timelike};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Key of the single-entry object a date cell is stored as.
pub const DATE_TAG: &str = "$date";

const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// A single spreadsheet cell, kept in the type the workbook decoder produced it with.
///
/// A stored row reads as a plain JSON object (`{"Rank": 3, "Name": "Alice"}`).
/// JSON strings always read back as `Text`; dates are written as
/// `{"$date": "2024-05-12T10:00:00"}` so they never collide with text that
/// happens to look like a timestamp.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Date(NaiveDateTime),
    Text(String),
}

impl CellValue {
    /// True for cells that carry no value: `Null` or whitespace-only text.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Best-effort integer reading used for ranks and points.
    ///
    /// Floats are truncated, text is parsed after trimming (integer first, then
    /// decimal). Booleans, dates and empty cells yield `None`.
    pub fn to_integer(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            CellValue::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            CellValue::Text(s) => {
                let s = s.trim();
                s.parse::<i64>().ok().or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite())
                        .map(|f| f.trunc() as i64)
                })
            }
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Integer(i) => write!(f, "{}", i),
            CellValue::Float(x) if x.fract() == 0.0 && x.abs() < 1e15 => {
                write!(f, "{}", *x as i64)
            }
            CellValue::Float(x) => write!(f, "{}", x),
            CellValue::Date(d) if d.time().num_seconds_from_midnight() == 0 => {
                write!(f, "{}", d.format("%Y-%m-%d"))
            }
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d %H:%M:%S")),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Null => serializer.serialize_unit(),
            CellValue::Bool(b) => serializer.serialize_bool(*b),
            CellValue::Integer(i) => serializer.serialize_i64(*i),
            CellValue::Float(f) => serializer.serialize_f64(*f),
            CellValue::Text(s) => serializer.serialize_str(s),
            CellValue::Date(d) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(DATE_TAG, &d.format(DATE_FORMAT).to_string())?;
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for CellValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CellVisitor;

        impl<'de> Visitor<'de> for CellVisitor {
            type Value = CellValue;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("null, a boolean, a number, a string or a tagged date")
            }

            fn visit_unit<E: de::Error>(self) -> Result<CellValue, E> {
                Ok(CellValue::Null)
            }

            fn visit_none<E: de::Error>(self) -> Result<CellValue, E> {
                Ok(CellValue::Null)
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<CellValue, E> {
                Ok(CellValue::Bool(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<CellValue, E> {
                Ok(CellValue::Integer(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<CellValue, E> {
                Ok(i64::try_from(v)
                    .map(CellValue::Integer)
                    .unwrap_or(CellValue::Float(v as f64)))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<CellValue, E> {
                Ok(CellValue::Float(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<CellValue, E> {
                Ok(CellValue::Text(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<CellValue, E> {
                Ok(CellValue::Text(v))
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<CellValue, A::Error> {
                let key = access
                    .next_key::<String>()?
                    .ok_or_else(|| de::Error::custom("empty object is not a cell value"))?;
                if key != DATE_TAG {
                    return Err(de::Error::unknown_field(&key, &[DATE_TAG]));
                }
                let raw: String = access.next_value()?;
                if access.next_key::<String>()?.is_some() {
                    return Err(de::Error::custom("a date cell holds exactly one entry"));
                }
                NaiveDateTime::parse_from_str(&raw, DATE_FORMAT)
                    .map(CellValue::Date)
                    .map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_any(CellVisitor)
    }
}

/// One data row of a sheet: header → cell, in the sheet's column order.
///
/// Inserting an existing header overwrites its value in place, like assigning
/// a key on a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetRow {
    cells: Vec<(String, CellValue)>,
}

impl SheetRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, header: impl Into<String>, value: CellValue) {
        let header = header.into();
        match self.cells.iter_mut().find(|(h, _)| *h == header) {
            Some((_, slot)) => *slot = value,
            None => self.cells.push((header, value)),
        }
    }

    pub fn get(&self, header: &str) -> Option<&CellValue> {
        self.cells
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(h, v)| (h.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// True when every cell is empty; such rows are not data.
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, v)| v.is_empty())
    }
}

impl<K: Into<String>> FromIterator<(K, CellValue)> for SheetRow {
    fn from_iter<I: IntoIterator<Item = (K, CellValue)>>(iter: I) -> Self {
        let mut row = SheetRow::new();
        for (header, value) in iter {
            row.insert(header, value);
        }
        row
    }
}

impl Serialize for SheetRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (header, value) in &self.cells {
            map.serialize_entry(header, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SheetRow {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RowVisitor;

        impl<'de> Visitor<'de> for RowVisitor {
            type Value = SheetRow;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of column headers to cell values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<SheetRow, A::Error> {
                let mut row = SheetRow::new();
                while let Some((header, value)) = access.next_entry::<String, CellValue>()? {
                    row.insert(header, value);
                }
                Ok(row)
            }
        }

        deserializer.deserialize_map(RowVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_row() -> SheetRow {
        let date = NaiveDate::from_ymd_opt(2024, 5, 12)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        SheetRow::from_iter([
            ("排名", CellValue::Integer(1)),
            ("车手", CellValue::Text("Alice".into())),
            ("Lap", CellValue::Float(92.481)),
            ("DNF", CellValue::Bool(false)),
            ("Date", CellValue::Date(date)),
            ("Note", CellValue::Null),
        ])
    }

    #[test]
    fn row_json_keeps_column_order_and_types() {
        let row = sample_row();
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(
            json,
            r#"{"排名":1,"车手":"Alice","Lap":92.481,"DNF":false,"Date":{"$date":"2024-05-12T00:00:00"},"Note":null}"#
        );

        let back: SheetRow = serde_json::from_str(&json).unwrap();
        assert_eq!(back, row);
    }

    #[test]
    fn timestamp_like_text_stays_text() {
        let json = r#"{"Note":"2024-05-12T10:00:00.5","When":{"$date":"2024-05-12T10:00:00.500"}}"#;
        let row: SheetRow = serde_json::from_str(json).unwrap();
        assert_eq!(
            row.get("Note"),
            Some(&CellValue::Text("2024-05-12T10:00:00.5".into()))
        );
        assert_eq!(row.get("When").unwrap().to_string(), "2024-05-12 10:00:00");
        assert_eq!(serde_json::to_string(&row).unwrap(), json);
    }

    #[test]
    fn objects_other_than_tagged_dates_are_rejected() {
        assert!(serde_json::from_str::<CellValue>(r#"{"x":1}"#).is_err());
        assert!(serde_json::from_str::<CellValue>(r#"{"$date":"not a date"}"#).is_err());
        assert_eq!(
            serde_json::from_str::<CellValue>("18446744073709551615").unwrap(),
            CellValue::Float(u64::MAX as f64)
        );
    }

    #[test]
    fn insert_overwrites_existing_header_in_place() {
        let mut row = SheetRow::new();
        row.insert("A", CellValue::Integer(1));
        row.insert("B", CellValue::Integer(2));
        row.insert("A", CellValue::Integer(3));

        let headers: Vec<_> = row.iter().map(|(h, _)| h).collect();
        assert_eq!(headers, vec!["A", "B"]);
        assert_eq!(row.get("A"), Some(&CellValue::Integer(3)));
    }

    #[test]
    fn integer_reading_is_best_effort() {
        assert_eq!(CellValue::Text(" 3 ".into()).to_integer(), Some(3));
        assert_eq!(CellValue::Text("12.9".into()).to_integer(), Some(12));
        assert_eq!(CellValue::Float(7.0).to_integer(), Some(7));
        assert_eq!(CellValue::Text("DNF".into()).to_integer(), None);
        assert_eq!(CellValue::Bool(true).to_integer(), None);
        assert_eq!(CellValue::Null.to_integer(), None);
    }

    #[test]
    fn display_renders_whole_floats_without_fraction() {
        assert_eq!(CellValue::Float(40.0).to_string(), "40");
        assert_eq!(CellValue::Float(40.5).to_string(), "40.5");
        assert_eq!(CellValue::Null.to_string(), "");
        assert_eq!(sample_row().get("Date").unwrap().to_string(), "2024-05-12");
    }
}
