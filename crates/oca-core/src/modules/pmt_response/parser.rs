use crate::common::constants::ANGLE_BINS;
use crate::domain::{OcaError, ParserResult};
use crate::parser::TableDocument;

pub(super) const RESPONSE_KEY: &str = "pmt_angular_response";
pub(super) const RESPONSE_ERROR_KEY: &str = "pmt_angular_response_errors";

#[derive(Debug, Clone, PartialEq)]
pub(super) struct AngularFit {
    pub(super) values: Vec<f64>,
    pub(super) errors: Vec<f64>,
}

pub(super) fn parse_angular_fit(document: &TableDocument) -> ParserResult<AngularFit> {
    let reader = document.reader();
    let values = reader.values(RESPONSE_KEY)?;
    let errors = reader
        .optional_values(RESPONSE_ERROR_KEY)?
        .unwrap_or_else(|| vec![0.0; values.len()]);

    for (key, list) in [(RESPONSE_KEY, &values), (RESPONSE_ERROR_KEY, &errors)] {
        if list.len() != ANGLE_BINS {
            return Err(OcaError::input_validation(
                "INPUT.ANGLE_BINS",
                format!(
                    "field '{}' in '{}' has {} bins, expected {}",
                    key,
                    document.label(),
                    list.len(),
                    ANGLE_BINS
                ),
            ));
        }
    }

    Ok(AngularFit { values, errors })
}
