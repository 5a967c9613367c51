//! Maps a PIT payload to the literal fragments of one table row.

use histograph_core::errors::{BuilderError, Error, Result};
use histograph_core::pit::{IdNormalizer, PitPayload, PIT_ENTITY_TYPE};

use super::literal::{encode, encode_text, quote_raw, LiteralValue, SQL_NULL};

/// Table columns in the order statements render them.
pub const PIT_COLUMNS: [&str; 6] = ["id", "dataset", "name", "type", "data", "geometry"];

/// Columns forming the primary key; never reassigned on conflict.
pub const PIT_KEY_COLUMNS: [&str; 2] = ["id", "dataset"];

/// Literal SQL fragments for one row, one per entry of [`PIT_COLUMNS`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PitRowLiterals {
    pub id: String,
    pub dataset: String,
    pub name: String,
    pub pit_type: String,
    pub data: String,
    pub geometry: String,
}

impl PitRowLiterals {
    /// `(column, literal)` pairs in [`PIT_COLUMNS`] order.
    pub fn entries(&self) -> [(&'static str, &str); 6] {
        [
            (PIT_COLUMNS[0], self.id.as_str()),
            (PIT_COLUMNS[1], self.dataset.as_str()),
            (PIT_COLUMNS[2], self.name.as_str()),
            (PIT_COLUMNS[3], self.pit_type.as_str()),
            (PIT_COLUMNS[4], self.data.as_str()),
            (PIT_COLUMNS[5], self.geometry.as_str()),
        ]
    }
}

/// Build the row literals for `pit` in `dataset`.
///
/// `dataset` and `type` are quoted without escaping; they are expected to be
/// simple identifiers.
pub fn to_row(
    pit: &PitPayload,
    dataset: &str,
    normalizer: &dyn IdNormalizer,
) -> Result<PitRowLiterals> {
    let raw_id = pit
        .raw_identifier()
        .ok_or_else(|| BuilderError::MissingIdentifier {
            entity_type: PIT_ENTITY_TYPE.to_string(),
            dataset: dataset.to_string(),
        })?;
    let id = normalizer.normalize(raw_id, dataset)?;
    if id.is_empty() {
        return Err(Error::normalize(format!(
            "id '{raw_id}' normalized to an empty string"
        )));
    }

    let geometry = match pit.geometry.as_ref() {
        Some(geometry) if !geometry.is_object() => {
            return Err(BuilderError::MalformedPayload {
                entity_type: PIT_ENTITY_TYPE.to_string(),
                message: "geometry must be a GeoJSON object".to_string(),
            }
            .into())
        }
        Some(geometry) => encode(LiteralValue::Geometry(geometry))?,
        None => SQL_NULL.to_string(),
    };

    Ok(PitRowLiterals {
        id: encode_text(&id),
        dataset: quote_raw(dataset),
        name: encode(pit.name.as_deref().into())?,
        pit_type: pit
            .pit_type
            .as_deref()
            .map_or_else(|| SQL_NULL.to_string(), quote_raw),
        data: match pit.data.as_ref() {
            Some(data) => encode(LiteralValue::Json(data))?,
            None => SQL_NULL.to_string(),
        },
        geometry,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use histograph_core::pit::HgidNormalizer;
    use serde_json::json;

    fn pit(value: serde_json::Value) -> PitPayload {
        serde_json::from_value(value).expect("pit payload")
    }

    #[test]
    fn maps_all_columns_in_order() {
        let row = to_row(
            &pit(json!({
                "id": "n1",
                "name": "O'Brien",
                "type": "hg:Person",
                "data": {"born": 1850},
                "geometry": {"type": "Point", "coordinates": [5.1, 52.1]}
            })),
            "ds1",
            &HgidNormalizer,
        )
        .expect("row");

        let columns: Vec<&str> = row.entries().iter().map(|(c, _)| *c).collect();
        assert_eq!(columns, PIT_COLUMNS);
        assert_eq!(row.id, "'urn:hgid:ds1/n1'");
        assert_eq!(row.dataset, "'ds1'");
        assert_eq!(row.name, "'O''Brien'");
        assert_eq!(row.pit_type, "'hg:Person'");
        assert_eq!(row.data, r#"'{"born":1850}'"#);
        assert!(row.geometry.starts_with("ST_SetSRID(ST_GeomFromGeoJSON('"));
    }

    #[test]
    fn absent_fields_become_null() {
        let row = to_row(&pit(json!({"uri": "http://example.org/p/1"})), "ds1", &HgidNormalizer)
            .expect("row");
        assert_eq!(row.id, "'http://example.org/p/1'");
        assert_eq!(row.name, "NULL");
        assert_eq!(row.pit_type, "NULL");
        assert_eq!(row.data, "NULL");
        assert_eq!(row.geometry, "NULL");
    }

    #[test]
    fn dataset_and_type_are_not_escaped() {
        let row = to_row(
            &pit(json!({"id": "n1", "type": "it's"})),
            "d'set",
            &|raw: &str, _: &str| -> Result<String> { Ok(raw.to_string()) },
        )
        .expect("row");
        assert_eq!(row.dataset, "'d'set'");
        assert_eq!(row.pit_type, "'it's'");
    }

    #[test]
    fn missing_identifier_is_a_builder_error() {
        let err = to_row(&pit(json!({"name": "nameless"})), "ds1", &HgidNormalizer)
            .expect_err("missing id");
        assert!(matches!(
            err,
            Error::Builder(BuilderError::MissingIdentifier { .. })
        ));
    }

    #[test]
    fn normalizer_failures_propagate() {
        let failing = |_: &str, _: &str| -> Result<String> { Err(Error::normalize("boom")) };
        let err = to_row(&pit(json!({"id": "n1"})), "ds1", &failing).expect_err("normalize");
        assert!(matches!(err, Error::Normalize(message) if message == "boom"));
    }

    #[test]
    fn non_object_geometry_is_rejected() {
        let err = to_row(
            &pit(json!({"id": "n1", "geometry": "POINT(1 2)"})),
            "ds1",
            &HgidNormalizer,
        )
        .expect_err("geometry");
        assert!(matches!(
            err,
            Error::Builder(BuilderError::MalformedPayload { .. })
        ));
    }
}
