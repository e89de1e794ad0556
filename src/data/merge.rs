use std::collections::BTreeMap;

use super::model::{cell, CellValue, Contribution, DepthScale, MagicTable, Row, TableType};

// ---------------------------------------------------------------------------
// Column propagation between tables
// ---------------------------------------------------------------------------

/// Copy `core_depth` from sites down to samples, keyed on `site`. A sample
/// that already carries a non-null value keeps it.
pub fn propagate_core_depth(con: &mut Contribution) {
    let site_depths: BTreeMap<String, CellValue> = match con.get(TableType::Sites) {
        Some(sites) => sites
            .rows
            .iter()
            .filter_map(|r| {
                let site = cell(r, "site");
                let depth = cell(r, "core_depth");
                (!site.is_null() && !depth.is_null())
                    .then(|| (site.to_string(), depth.clone()))
            })
            .collect(),
        None => return,
    };

    if let Some(samples) = con.get_mut(TableType::Samples) {
        for row in &mut samples.rows {
            if cell(row, "core_depth").is_null() {
                let site = cell(row, "site").to_string();
                if let Some(depth) = site_depths.get(&site) {
                    row.insert("core_depth".to_string(), depth.clone());
                }
            }
        }
        if !samples.column_names.iter().any(|c| c == "core_depth") {
            samples.column_names.push("core_depth".to_string());
        }
    }
}

/// Copy `location` from sites down to specimens, walking
/// specimen → sample → site.
pub fn propagate_location_to_specimens(con: &mut Contribution) {
    let site_locations: BTreeMap<String, CellValue> = match con.get(TableType::Sites) {
        Some(sites) => sites
            .rows
            .iter()
            .filter_map(|r| {
                let site = cell(r, "site");
                let loc = cell(r, "location");
                (!site.is_null() && !loc.is_null()).then(|| (site.to_string(), loc.clone()))
            })
            .collect(),
        None => return,
    };

    let sample_sites: BTreeMap<String, String> = match con.get(TableType::Samples) {
        Some(samples) => samples
            .rows
            .iter()
            .filter_map(|r| {
                let sample = cell(r, "sample");
                let site = cell(r, "site");
                (!sample.is_null() && !site.is_null())
                    .then(|| (sample.to_string(), site.to_string()))
            })
            .collect(),
        None => BTreeMap::new(),
    };

    if let Some(specimens) = con.get_mut(TableType::Specimens) {
        for row in &mut specimens.rows {
            if !cell(row, "location").is_null() {
                continue;
            }
            let sample = cell(row, "sample").to_string();
            let loc = sample_sites
                .get(&sample)
                .and_then(|site| site_locations.get(site));
            if let Some(loc) = loc {
                row.insert("location".to_string(), loc.clone());
            }
        }
        if !specimens.column_names.iter().any(|c| c == "location") {
            specimens.column_names.push("location".to_string());
        }
    }
}

// ---------------------------------------------------------------------------
// Specimen ⋈ sample/age join
// ---------------------------------------------------------------------------

/// Inner-join specimens with the depth-carrying table (samples or ages)
/// on `sample`, attaching only the depth-scale column. Rows without a
/// matching sample are dropped.
pub fn join_specimen_depths(
    specimens: &MagicTable,
    depth_table: &MagicTable,
    scale: DepthScale,
) -> Vec<Row> {
    let depth_by_sample: BTreeMap<String, CellValue> = depth_table
        .rows
        .iter()
        .filter_map(|r| {
            let sample = cell(r, "sample");
            (!sample.is_null()).then(|| (sample.to_string(), cell(r, scale.column()).clone()))
        })
        .collect();

    specimens
        .rows
        .iter()
        .filter_map(|r| {
            let sample = cell(r, "sample").to_string();
            depth_by_sample.get(&sample).map(|depth| {
                let mut row = r.clone();
                row.insert(scale.column().to_string(), depth.clone());
                row
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Depth filtering
// ---------------------------------------------------------------------------

/// Drop rows with a null/falsy or non-numeric depth value, apply the depth
/// bounds, and copy the depth into the working `core_depth` field.
///
/// The two bounds are independent one-sided filters, with an unset bound
/// participating in the other branch as the sentinel `-1.0`: when `dmin` is
/// set, rows must satisfy `depth < dmax_or(-1)`; when `dmax` is set, rows
/// must satisfy `depth > dmin_or(-1)`. Upstream data tools have shipped this
/// exact behavior for years, so it is pinned here rather than replaced with
/// a combined range check (see DESIGN.md).
pub fn filter_depths(
    rows: Vec<Row>,
    scale: DepthScale,
    dmin: Option<f64>,
    dmax: Option<f64>,
) -> Vec<Row> {
    let dmin_sentinel = dmin.unwrap_or(-1.0);
    let dmax_sentinel = dmax.unwrap_or(-1.0);

    rows.into_iter()
        .filter_map(|mut row| {
            let value = cell(&row, scale.column());
            if !value.is_truthy() {
                return None;
            }
            let depth = value.as_f64()?;
            if dmin.is_some() && dmin_sentinel != -1.0 && !(depth < dmax_sentinel) {
                return None;
            }
            if dmax.is_some() && dmax_sentinel != -1.0 && !(depth > dmin_sentinel) {
                return None;
            }
            row.insert("core_depth".to_string(), CellValue::Float(depth));
            Some(row)
        })
        .collect()
}

/// Uppercase every sample name for lookup consistency.
pub fn uppercase_sample_names(rows: &mut [Row]) {
    for row in rows {
        if let Some(CellValue::String(s)) = row.get_mut("sample") {
            *s = s.to_uppercase();
        }
    }
}

// ---------------------------------------------------------------------------
// Bulk susceptibility series
// ---------------------------------------------------------------------------

/// Derive a specimen-keyed bulk-susceptibility series from the measurements
/// table, joined to specimen depths. Values are scaled to microSI. Rows with
/// an empty specimen or falsy susceptibility are discarded first.
pub fn bulk_susceptibility(measurements: &MagicTable, records: &[Row]) -> (Vec<f64>, Vec<f64>) {
    let depth_by_specimen: BTreeMap<String, f64> = records
        .iter()
        .filter_map(|r| {
            let specimen = cell(r, "specimen");
            let depth = cell(r, "core_depth").as_f64()?;
            (!specimen.is_null()).then(|| (specimen.to_string(), depth))
        })
        .collect();

    let mut bulks = Vec::new();
    let mut depths = Vec::new();
    for row in &measurements.rows {
        let specimen = cell(row, "specimen");
        let chi = cell(row, "susc_chi_volume");
        if !specimen.is_truthy() || !chi.is_truthy() {
            continue;
        }
        let Some(chi) = chi.as_f64() else { continue };
        if let Some(&depth) = depth_by_specimen.get(&specimen.to_string()) {
            bulks.push(chi * 1e6);
            depths.push(depth);
        }
    }
    (bulks, depths)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn depth_row(depth: f64) -> Row {
        let mut row = Row::new();
        row.insert("specimen".into(), CellValue::String("sp".into()));
        row.insert("core_depth".into(), CellValue::Float(depth));
        row
    }

    fn depths_of(rows: &[Row]) -> Vec<f64> {
        rows.iter()
            .map(|r| cell(r, "core_depth").as_f64().unwrap())
            .collect()
    }

    #[test]
    fn falsy_depths_are_dropped() {
        let mut null_row = Row::new();
        null_row.insert("specimen".into(), CellValue::String("sp0".into()));
        null_row.insert("core_depth".into(), CellValue::Null);
        let rows = vec![null_row, depth_row(0.0), depth_row(4.2)];
        let kept = filter_depths(rows, DepthScale::CoreDepth, None, None);
        assert_eq!(depths_of(&kept), vec![4.2]);
    }

    // Regression: the two bound checks are independent one-sided filters,
    // not a combined range predicate.
    #[test]
    fn depth_bounds_are_asymmetric_one_sided_filters() {
        let rows = || vec![depth_row(5.0), depth_row(10.0), depth_row(30.0), depth_row(50.0), depth_row(60.0)];

        // Both bounds set: dmin branch keeps depth < 50, dmax branch keeps
        // depth > 10. Boundary rows at exactly dmin/dmax are excluded.
        let kept = filter_depths(rows(), DepthScale::CoreDepth, Some(10.0), Some(50.0));
        assert_eq!(depths_of(&kept), vec![30.0]);

        // Only dmin set: its branch compares against the unset dmax
        // sentinel (-1), so depth < -1 drops every row.
        let kept = filter_depths(rows(), DepthScale::CoreDepth, Some(10.0), None);
        assert!(kept.is_empty());

        // Only dmax set: its branch compares against the unset dmin
        // sentinel (-1), so depth > -1 keeps every row.
        let kept = filter_depths(rows(), DepthScale::CoreDepth, None, Some(50.0));
        assert_eq!(depths_of(&kept), vec![5.0, 10.0, 30.0, 50.0, 60.0]);
    }

    #[test]
    fn join_keeps_only_inner_matches() {
        let mut sp1 = Row::new();
        sp1.insert("specimen".into(), CellValue::String("sp1".into()));
        sp1.insert("sample".into(), CellValue::String("sa1".into()));
        let mut sp2 = Row::new();
        sp2.insert("specimen".into(), CellValue::String("sp2".into()));
        sp2.insert("sample".into(), CellValue::String("orphan".into()));
        let specimens = MagicTable::from_rows(vec![sp1, sp2]);

        let mut sa1 = Row::new();
        sa1.insert("sample".into(), CellValue::String("sa1".into()));
        sa1.insert("core_depth".into(), CellValue::Float(12.0));
        let samples = MagicTable::from_rows(vec![sa1]);

        let merged = join_specimen_depths(&specimens, &samples, DepthScale::CoreDepth);
        assert_eq!(merged.len(), 1);
        assert_eq!(cell(&merged[0], "core_depth").as_f64(), Some(12.0));
    }

    #[test]
    fn bulk_series_skips_falsy_and_unmatched_rows() {
        let mut good = Row::new();
        good.insert("specimen".into(), CellValue::String("sp".into()));
        good.insert("susc_chi_volume".into(), CellValue::Float(2.5e-4));
        let mut zero_chi = Row::new();
        zero_chi.insert("specimen".into(), CellValue::String("sp".into()));
        zero_chi.insert("susc_chi_volume".into(), CellValue::Float(0.0));
        let mut no_spec = Row::new();
        no_spec.insert("specimen".into(), CellValue::Null);
        no_spec.insert("susc_chi_volume".into(), CellValue::Float(1e-4));
        let meas = MagicTable::from_rows(vec![good, zero_chi, no_spec]);

        let records = vec![depth_row(7.5)];
        let (bulks, depths) = bulk_susceptibility(&meas, &records);
        assert_eq!(bulks, vec![250.0]);
        assert_eq!(depths, vec![7.5]);
    }
}
