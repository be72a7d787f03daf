//! Query parameter types for the named analysis endpoints.
//!
//! Each endpoint fixes the analysis raster and statistics and exposes a
//! small set of query parameters, which translate into a full
//! [`AnalysisRequest`] once the geostore geometry is resolved.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use geoprocessing::{Analysis, AnalysisRequest, Filter};
use zonal_common::{Polygon, ZonalError, ZonalResult};

use crate::convert::{encode_alert_date, GLAD_CONFIRMED_OFFSET, GLAD_RASTER_ID, LOSS_RASTER_ID};

fn default_threshold() -> u8 {
    30
}

fn default_extent_year() -> u16 {
    2000
}

/// Query parameters for `GET /analysis/treecoverloss`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TreeCoverLossQuery {
    /// Geostore entry holding the analysis geometry.
    pub geostore_id: String,

    /// Minimum percent tree canopy density for a pixel to count.
    #[serde(default = "default_threshold")]
    pub threshold: u8,

    /// Tree cover extent baseline year for the density layer.
    #[serde(default = "default_extent_year")]
    pub extent_year: u16,

    /// Earliest loss year to include. Only a lower bound is supported:
    /// filters are one-sided threshold tests.
    #[serde(default)]
    pub start: Option<u16>,
}

impl TreeCoverLossQuery {
    /// Validate parameter values.
    pub fn validate(&self) -> ZonalResult<()> {
        if self.threshold > 100 {
            return Err(ZonalError::InvalidParameter {
                param: "threshold".to_string(),
                message: format!("{} is not a percentage in 0..=100", self.threshold),
            });
        }
        if self.extent_year != 2000 && self.extent_year != 2010 {
            return Err(ZonalError::InvalidParameter {
                param: "extent_year".to_string(),
                message: format!("{} is not a supported extent year (2000, 2010)", self.extent_year),
            });
        }
        if let Some(start) = self.start {
            if start < 2001 {
                return Err(ZonalError::InvalidParameter {
                    param: "start".to_string(),
                    message: format!("{} precedes the first recorded loss year (2001)", start),
                });
            }
        }
        Ok(())
    }

    /// Id of the tree cover density raster for the chosen extent year.
    pub fn density_raster_id(&self) -> String {
        format!("tcd_{}", self.extent_year)
    }

    /// Build the core analysis request for this query.
    ///
    /// Loss pixels encode the year as an offset from 2000, so a start year
    /// becomes a threshold filter on the loss raster itself.
    pub fn to_request(&self, geometry: Polygon) -> ZonalResult<AnalysisRequest> {
        self.validate()?;
        let mut filters = vec![Filter {
            raster_id: self.density_raster_id(),
            threshold: self.threshold as f64,
        }];
        if let Some(start) = self.start {
            filters.push(Filter {
                raster_id: LOSS_RASTER_ID.to_string(),
                threshold: (start - 2000) as f64,
            });
        }
        Ok(AnalysisRequest {
            geometry,
            analysis_raster_id: LOSS_RASTER_ID.to_string(),
            contextual_raster_ids: vec![],
            aggregate_raster_ids: vec![],
            filters,
            analyses: vec![Analysis::Area],
        })
    }
}

/// Query parameters for `GET /analysis/gladalerts`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GladAlertsQuery {
    /// Geostore entry holding the analysis geometry.
    pub geostore_id: String,

    /// Earliest alert date to include, `YYYY-MM-DD`. Without it, every
    /// confirmed alert counts. Only a lower bound is supported: filters
    /// are one-sided threshold tests.
    #[serde(default)]
    pub start_date: Option<String>,
}

impl GladAlertsQuery {
    /// Parse and validate the start date, if given.
    pub fn parsed_start_date(&self) -> ZonalResult<Option<NaiveDate>> {
        let Some(raw) = &self.start_date else {
            return Ok(None);
        };
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ZonalError::InvalidParameter {
                param: "start_date".to_string(),
                message: format!("'{}' is not a YYYY-MM-DD date", raw),
            })
    }

    /// Build the core analysis request for this query.
    ///
    /// Alert values encode the date, so a date lower bound is a threshold
    /// filter on the alert raster itself. The confirmation offset is the
    /// floor: unconfirmed pixels never pass.
    pub fn to_request(&self, geometry: Polygon) -> ZonalResult<AnalysisRequest> {
        let threshold = match self.parsed_start_date()? {
            Some(date) => encode_alert_date(date),
            None => GLAD_CONFIRMED_OFFSET,
        };
        Ok(AnalysisRequest {
            geometry,
            analysis_raster_id: GLAD_RASTER_ID.to_string(),
            contextual_raster_ids: vec![],
            aggregate_raster_ids: vec![],
            filters: vec![Filter {
                raster_id: GLAD_RASTER_ID.to_string(),
                threshold,
            }],
            analyses: vec![Analysis::Count],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Polygon {
        Polygon::new(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)])
    }

    #[test]
    fn test_treecoverloss_defaults() {
        let query: TreeCoverLossQuery =
            serde_json::from_str(r#"{"geostore_id": "abc123"}"#).unwrap();
        assert_eq!(query.threshold, 30);
        assert_eq!(query.extent_year, 2000);

        assert_eq!(query.start, None);

        let req = query.to_request(unit_square()).unwrap();
        assert_eq!(req.analysis_raster_id, "loss");
        assert_eq!(req.filters.len(), 1);
        assert_eq!(req.filters[0].raster_id, "tcd_2000");
        assert_eq!(req.filters[0].threshold, 30.0);
        assert_eq!(req.analyses, vec![Analysis::Area]);
    }

    #[test]
    fn test_treecoverloss_start_year_filter() {
        let query = TreeCoverLossQuery {
            geostore_id: "abc".to_string(),
            threshold: 30,
            extent_year: 2000,
            start: Some(2005),
        };
        let req = query.to_request(unit_square()).unwrap();
        assert_eq!(req.filters.len(), 2);
        assert_eq!(req.filters[1].raster_id, "loss");
        // 2005 encodes as 5 in the loss raster's value space.
        assert_eq!(req.filters[1].threshold, 5.0);
    }

    #[test]
    fn test_treecoverloss_rejects_start_before_record() {
        let query = TreeCoverLossQuery {
            geostore_id: "abc".to_string(),
            threshold: 30,
            extent_year: 2000,
            start: Some(1999),
        };
        let err = query.to_request(unit_square()).unwrap_err();
        assert_eq!(err.http_status_code(), 400);
    }

    #[test]
    fn test_treecoverloss_rejects_bad_extent_year() {
        let query = TreeCoverLossQuery {
            geostore_id: "abc".to_string(),
            threshold: 30,
            extent_year: 2005,
            start: None,
        };
        let err = query.to_request(unit_square()).unwrap_err();
        assert_eq!(err.http_status_code(), 400);
    }

    #[test]
    fn test_treecoverloss_rejects_bad_threshold() {
        let query = TreeCoverLossQuery {
            geostore_id: "abc".to_string(),
            threshold: 130,
            extent_year: 2000,
            start: None,
        };
        assert!(query.validate().is_err());
    }

    #[test]
    fn test_gladalerts_start_date_filter() {
        let query = GladAlertsQuery {
            geostore_id: "abc".to_string(),
            start_date: Some("2016-01-01".to_string()),
        };
        let req = query.to_request(unit_square()).unwrap();
        assert_eq!(req.analysis_raster_id, "glad_alerts");
        // 365 days after the 2015-01-01 epoch.
        assert_eq!(req.filters[0].threshold, 30_365.0);
        assert_eq!(req.analyses, vec![Analysis::Count]);
    }

    #[test]
    fn test_gladalerts_default_is_confirmed_floor() {
        let query = GladAlertsQuery {
            geostore_id: "abc".to_string(),
            start_date: None,
        };
        let req = query.to_request(unit_square()).unwrap();
        assert_eq!(req.filters[0].threshold, 30_000.0);
    }

    #[test]
    fn test_gladalerts_rejects_malformed_date() {
        let query = GladAlertsQuery {
            geostore_id: "abc".to_string(),
            start_date: Some("01/02/2020".to_string()),
        };
        let err = query.to_request(unit_square()).unwrap_err();
        assert_eq!(err.http_status_code(), 400);
    }
}
