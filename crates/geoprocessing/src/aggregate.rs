//! Group-by aggregation of pixel tables into summary statistics.

use std::collections::HashMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::assemble::PixelTable;
use crate::error::{GeoprocessingError, Result};

/// A statistic that can be requested for each pixel group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Analysis {
    /// Number of pixels in the group.
    Count,
    /// Summed geodesic area of the group's pixels.
    Area,
    /// Per-aggregate-raster sum over the group's pixels.
    Sum,
}

/// Values of one result column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColumnValues {
    /// Exact integer statistics (pixel counts).
    Int(Vec<u64>),
    /// Floating point statistics and group-key values.
    Float(Vec<f64>),
}

impl ColumnValues {
    /// Number of groups in this column.
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Int(v) => v.len(),
            ColumnValues::Float(v) => v.len(),
        }
    }

    /// True when the column has no groups.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Aggregation result: column name → per-group values, index-aligned.
///
/// Row *i* across every column belongs to the same group. Serializes as a
/// JSON object whose keys keep insertion order: group-key columns first,
/// then one column per requested statistic.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    columns: Vec<(String, ColumnValues)>,
}

impl ResultTable {
    /// Column names in output order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnValues> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Number of groups.
    pub fn num_groups(&self) -> usize {
        self.columns.first().map(|(_, v)| v.len()).unwrap_or(0)
    }

    /// Iterate columns in output order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnValues)> {
        self.columns.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl Serialize for ResultTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, values) in &self.columns {
            map.serialize_entry(name, values)?;
        }
        map.end()
    }
}

/// Partition the table's rows by their group key (the tuple of analysis +
/// contextual column values) and reduce each group into the requested
/// statistics.
///
/// Groups appear in ascending lexicographic key order, so identical inputs
/// always produce identical output. `Analysis::Area` fails with
/// [`GeoprocessingError::MissingColumn`] when the table was built without
/// an area column. A group only exists if at least one row maps to it.
pub fn aggregate(table: &PixelTable, analyses: &[Analysis]) -> Result<ResultTable> {
    if analyses.contains(&Analysis::Area) && table.area_index.is_none() {
        return Err(GeoprocessingError::MissingColumn("area".to_string()));
    }

    let group_count = table.group_count;
    let aggregate_columns = table.aggregate_columns().to_vec();
    let agg_start = group_count;

    struct GroupStats {
        key: Vec<f64>,
        count: u64,
        area: f64,
        sums: Vec<f64>,
    }

    // Keys are grouped via their bit patterns (keys never contain NaN:
    // nodata pixels are masked before grouping), then sorted numerically.
    let mut groups: HashMap<Vec<u64>, GroupStats> = HashMap::new();

    for row in table.data.rows() {
        let key: Vec<f64> = row.iter().take(group_count).copied().collect();
        let bits: Vec<u64> = key.iter().map(|v| v.to_bits()).collect();

        let entry = groups.entry(bits).or_insert_with(|| GroupStats {
            key,
            count: 0,
            area: 0.0,
            sums: vec![0.0; aggregate_columns.len()],
        });

        entry.count += 1;
        if let Some(area_index) = table.area_index {
            entry.area += row[area_index];
        }
        for (i, sum) in entry.sums.iter_mut().enumerate() {
            *sum += row[agg_start + i];
        }
    }

    let mut ordered: Vec<GroupStats> = groups.into_values().collect();
    ordered.sort_by(|a, b| {
        a.key
            .iter()
            .zip(&b.key)
            .map(|(x, y)| x.partial_cmp(y).unwrap_or(std::cmp::Ordering::Equal))
            .find(|o| !o.is_eq())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut columns: Vec<(String, ColumnValues)> = Vec::new();

    for (i, name) in table.columns[..group_count].iter().enumerate() {
        let values: Vec<f64> = ordered.iter().map(|g| g.key[i]).collect();
        columns.push((name.clone(), ColumnValues::Float(values)));
    }

    for analysis in analyses {
        match analysis {
            Analysis::Count => {
                let values: Vec<u64> = ordered.iter().map(|g| g.count).collect();
                columns.push(("count".to_string(), ColumnValues::Int(values)));
            }
            Analysis::Area => {
                let values: Vec<f64> = ordered.iter().map(|g| g.area).collect();
                columns.push(("area".to_string(), ColumnValues::Float(values)));
            }
            Analysis::Sum => {
                for (i, name) in aggregate_columns.iter().enumerate() {
                    let values: Vec<f64> = ordered.iter().map(|g| g.sums[i]).collect();
                    columns.push((name.clone(), ColumnValues::Float(values)));
                }
            }
        }
    }

    Ok(ResultTable { columns })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    const AREA: f64 = 769.288482;

    /// The six-row table from the assembler tests, with an area column.
    fn area_table() -> PixelTable {
        let data = array![
            [3.0, 4.0, 5.0, AREA],
            [3.0, 4.0, 5.0, AREA],
            [4.0, 5.0, 6.0, AREA],
            [3.0, 4.0, 5.0, AREA],
            [4.0, 5.0, 6.0, AREA],
            [5.0, 6.0, 7.0, AREA]
        ];
        PixelTable {
            columns: vec![
                "loss".to_string(),
                "wdpa".to_string(),
                "tcd_2000".to_string(),
                "area".to_string(),
            ],
            data,
            group_count: 2,
            area_index: Some(3),
        }
    }

    #[test]
    fn test_sum_over_groups() {
        let table = area_table();
        let result = aggregate(&table, &[Analysis::Sum, Analysis::Area]).unwrap();

        assert_eq!(result.num_groups(), 3);
        assert_eq!(
            result.column("loss"),
            Some(&ColumnValues::Float(vec![3.0, 4.0, 5.0]))
        );
        assert_eq!(
            result.column("wdpa"),
            Some(&ColumnValues::Float(vec![4.0, 5.0, 6.0]))
        );
        assert_eq!(
            result.column("tcd_2000"),
            Some(&ColumnValues::Float(vec![5.0 * 3.0, 6.0 * 2.0, 7.0]))
        );
        assert_eq!(
            result.column("area"),
            Some(&ColumnValues::Float(vec![
                AREA * 3.0,
                AREA * 2.0,
                AREA
            ]))
        );
    }

    #[test]
    fn test_counts_partition_the_table() {
        let table = area_table();
        let result = aggregate(&table, &[Analysis::Count]).unwrap();

        let Some(ColumnValues::Int(counts)) = result.column("count") else {
            panic!("count column missing");
        };
        assert_eq!(counts, &vec![3, 2, 1]);
        assert_eq!(counts.iter().sum::<u64>() as usize, table.len());
    }

    #[test]
    fn test_area_additivity() {
        let table = area_table();
        let result = aggregate(&table, &[Analysis::Area]).unwrap();

        let Some(ColumnValues::Float(areas)) = result.column("area") else {
            panic!("area column missing");
        };
        let total: f64 = areas.iter().sum();
        let expected: f64 = table.data.column(3).sum();
        assert!((total - expected).abs() < 1e-9);
    }

    #[test]
    fn test_area_without_column_is_missing_column() {
        let mut table = area_table();
        table.area_index = None;
        table.columns.pop();
        table.data = table.data.slice(ndarray::s![.., ..3]).to_owned();

        let err = aggregate(&table, &[Analysis::Count, Analysis::Area]).unwrap_err();
        assert!(matches!(err, GeoprocessingError::MissingColumn(_)));
    }

    #[test]
    fn test_group_order_is_ascending_lexicographic() {
        let data = array![
            [2.0, 9.0],
            [1.0, 5.0],
            [2.0, 1.0],
            [1.0, 5.0]
        ];
        let table = PixelTable {
            columns: vec!["a".to_string(), "b".to_string()],
            data,
            group_count: 2,
            area_index: None,
        };

        let result = aggregate(&table, &[Analysis::Count]).unwrap();
        assert_eq!(
            result.column("a"),
            Some(&ColumnValues::Float(vec![1.0, 2.0, 2.0]))
        );
        assert_eq!(
            result.column("b"),
            Some(&ColumnValues::Float(vec![5.0, 1.0, 9.0]))
        );
    }

    #[test]
    fn test_empty_table_yields_empty_lists() {
        let table = PixelTable {
            columns: vec!["a".to_string()],
            data: Array2::zeros((0, 1)),
            group_count: 1,
            area_index: None,
        };

        let result = aggregate(&table, &[Analysis::Count]).unwrap();
        assert_eq!(result.num_groups(), 0);
        assert_eq!(result.column("count"), Some(&ColumnValues::Int(vec![])));
    }

    #[test]
    fn test_serializes_as_ordered_object() {
        let table = area_table();
        let result = aggregate(&table, &[Analysis::Count, Analysis::Area]).unwrap();
        let json = serde_json::to_string(&result).unwrap();

        // Group-key columns first, then statistics, in request order.
        let loss = json.find("\"loss\"").unwrap();
        let wdpa = json.find("\"wdpa\"").unwrap();
        let count = json.find("\"count\"").unwrap();
        let area = json.find("\"area\"").unwrap();
        assert!(loss < wdpa && wdpa < count && count < area);

        // Counts serialize as exact integers.
        assert!(json.contains("\"count\":[3,2,1]"));
    }
}
