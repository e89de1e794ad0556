use std::path::PathBuf;

use ani_depthplot::data::model::{CellValue, Row};
use ani_depthplot::{
    ani_depthplot, ani_depthplot_from, Contribution, DepthPlotError, DepthPlotOptions,
    DepthScale, ImageFormat, MagicTable, PanelKind, TableType,
};

// ---------------------------------------------------------------------------
// In-memory table helpers
// ---------------------------------------------------------------------------

fn row(cells: &[(&str, &str)]) -> Row {
    cells
        .iter()
        .map(|(k, v)| (k.to_string(), CellValue::parse(v)))
        .collect()
}

fn table(rows: &[&[(&str, &str)]]) -> MagicTable {
    MagicTable::from_rows(rows.iter().map(|r| row(r)).collect())
}

fn specimens_table() -> MagicTable {
    table(&[
        &[
            ("specimen", "sp1"),
            ("sample", "sa1"),
            ("aniso_s", "0.340000:0.333333:0.326667:0.001:0.0:0.0"),
            ("aniso_s_n_measurements", "15"),
            ("aniso_s_sigma", "0.002"),
        ],
        &[
            ("specimen", "sp2"),
            ("sample", "sa2"),
            ("aniso_s", "0.336000:0.334000:0.330000:0.0:0.001:0.0"),
            ("aniso_s_n_measurements", "15"),
            ("aniso_s_sigma", "0.002"),
        ],
    ])
}

fn samples_table() -> MagicTable {
    table(&[
        &[("sample", "sa1"), ("site", "st1"), ("core_depth", "10.0")],
        &[("sample", "sa2"), ("site", "st2"), ("core_depth", "42.0")],
    ])
}

fn sites_table() -> MagicTable {
    table(&[
        &[("site", "st1"), ("location", "Hole A"), ("core_depth", "10.0")],
        &[("site", "st2"), ("location", "Hole A"), ("core_depth", "42.0")],
    ])
}

fn base_contribution() -> Contribution {
    let mut con = Contribution::new();
    con.insert(TableType::Specimens, specimens_table());
    con.insert(TableType::Samples, samples_table());
    con.insert(TableType::Sites, sites_table());
    con
}

fn options() -> DepthPlotOptions {
    DepthPlotOptions::default()
}

// ---------------------------------------------------------------------------
// Required-table validation
// ---------------------------------------------------------------------------

#[test]
fn missing_specimens_is_reported_by_name() {
    let mut con = Contribution::new();
    con.insert(TableType::Samples, samples_table());
    con.insert(TableType::Sites, sites_table());
    let err = ani_depthplot_from(con, &[], &options()).unwrap_err();
    assert_eq!(err.to_string(), "missing required file type: specimens");
}

#[test]
fn missing_sites_is_reported_by_name() {
    let mut con = Contribution::new();
    con.insert(TableType::Specimens, specimens_table());
    con.insert(TableType::Samples, samples_table());
    let err = ani_depthplot_from(con, &[], &options()).unwrap_err();
    assert_eq!(err.to_string(), "missing required file type: sites");
}

#[test]
fn missing_samples_and_ages_is_reported_as_samples() {
    let mut con = Contribution::new();
    con.insert(TableType::Specimens, specimens_table());
    con.insert(TableType::Sites, sites_table());
    let err = ani_depthplot_from(con, &[], &options()).unwrap_err();
    assert_eq!(err.to_string(), "missing required file type: samples");
}

#[test]
fn ages_table_satisfies_the_samples_requirement() {
    let mut con = Contribution::new();
    con.insert(TableType::Specimens, specimens_table());
    con.insert(TableType::Sites, sites_table());
    con.insert(
        TableType::Ages,
        table(&[
            &[("sample", "sa1"), ("age", "1.2"), ("age_unit", "Ma")],
            &[("sample", "sa2"), ("age", "3.4"), ("age_unit", "Ma")],
        ]),
    );
    let plot = ani_depthplot_from(con, &[], &options()).unwrap();
    assert_eq!(plot.figure.y_label, "Age (Ma)");
}

// ---------------------------------------------------------------------------
// Empty result sets
// ---------------------------------------------------------------------------

#[test]
fn zero_rows_after_filtering_is_no_data() {
    // dmin alone compares against the unset dmax sentinel and drops
    // every row.
    let mut opts = options();
    opts.dmin = Some(5.0);
    let err = ani_depthplot_from(base_contribution(), &[], &opts).unwrap_err();
    assert!(matches!(err, DepthPlotError::NoData));
    assert_eq!(err.to_string(), "no data to plot");
}

#[test]
fn null_tensor_rows_alone_are_no_data() {
    let mut con = base_contribution();
    con.insert(
        TableType::Specimens,
        table(&[&[
            ("specimen", "sp1"),
            ("sample", "sa1"),
            ("aniso_s", ""),
            ("aniso_s_n_measurements", "15"),
            ("aniso_s_sigma", "0.002"),
        ]]),
    );
    let err = ani_depthplot_from(con, &[], &options()).unwrap_err();
    assert!(matches!(err, DepthPlotError::NoData));
}

#[test]
fn malformed_tensor_is_a_named_error() {
    let mut con = base_contribution();
    con.insert(
        TableType::Specimens,
        table(&[&[
            ("specimen", "sp1"),
            ("sample", "sa1"),
            ("aniso_s", "0.34:0.33:0.33"),
            ("aniso_s_n_measurements", "15"),
            ("aniso_s_sigma", "0.002"),
        ]]),
    );
    let err = ani_depthplot_from(con, &[], &options()).unwrap_err();
    assert!(matches!(err, DepthPlotError::MalformedTensor { .. }));
}

// ---------------------------------------------------------------------------
// Panel list
// ---------------------------------------------------------------------------

#[test]
fn four_panels_without_measurements() {
    let plot = ani_depthplot_from(base_contribution(), &[], &options()).unwrap();
    assert_eq!(plot.figure.panels.len(), 4);
    assert!(!plot.figure.has_panel(PanelKind::BulkSusceptibility));
}

#[test]
fn bulk_panel_appears_with_measurements() {
    let mut con = base_contribution();
    con.insert(
        TableType::Measurements,
        table(&[
            &[("measurement", "m1"), ("specimen", "sp1"), ("susc_chi_volume", "2.5e-4")],
            &[("measurement", "m2"), ("specimen", "sp2"), ("susc_chi_volume", "1.5e-4")],
        ]),
    );
    let plot = ani_depthplot_from(con, &[], &options()).unwrap();
    assert_eq!(plot.figure.panels.len(), 5);
    assert_eq!(
        plot.figure.panels.last().unwrap().kind,
        PanelKind::BulkSusceptibility
    );
}

#[test]
fn measurements_without_usable_rows_do_not_add_a_panel() {
    let mut con = base_contribution();
    con.insert(
        TableType::Measurements,
        table(&[&[("measurement", "m1"), ("specimen", ""), ("susc_chi_volume", "2.5e-4")]]),
    );
    let plot = ani_depthplot_from(con, &[], &options()).unwrap();
    assert_eq!(plot.figure.panels.len(), 4);
}

// ---------------------------------------------------------------------------
// Figure content
// ---------------------------------------------------------------------------

#[test]
fn filename_uses_resolved_location_and_format() {
    let mut opts = options();
    opts.fmt = ImageFormat::Png;
    let plot = ani_depthplot_from(base_contribution(), &[], &opts).unwrap();
    assert_eq!(plot.file_names, vec!["Hole A_ani_depthplot.png".to_string()]);
    assert_eq!(plot.figure.location, "Hole A");
}

#[test]
fn location_falls_back_to_unknown() {
    let mut con = Contribution::new();
    con.insert(TableType::Specimens, specimens_table());
    con.insert(
        TableType::Samples,
        table(&[
            &[("sample", "sa1"), ("site", "st1"), ("core_depth", "10.0")],
            &[("sample", "sa2"), ("site", "st2"), ("core_depth", "42.0")],
        ]),
    );
    // Sites table present but with no location column values.
    con.insert(
        TableType::Sites,
        table(&[&[("site", "st1")], &[("site", "st2")]]),
    );
    let plot = ani_depthplot_from(con, &[], &options()).unwrap();
    assert_eq!(plot.file_names, vec!["unknown_ani_depthplot.svg".to_string()]);
}

#[test]
fn eigenvalue_axis_is_clamped_for_normalized_tensors() {
    let plot = ani_depthplot_from(base_contribution(), &[], &options()).unwrap();
    let panel = &plot.figure.panels[0];
    assert_eq!(panel.kind, PanelKind::Eigenvalues);
    // Trace-normalized eigenvalues sit near 1/3, so both clamps engage.
    assert_eq!(panel.x_range, (0.3, 0.36));
}

#[test]
fn depth_axis_spans_the_data_and_is_inverted_at_render_time() {
    let plot = ani_depthplot_from(base_contribution(), &[], &options()).unwrap();
    assert_eq!(plot.figure.depth_range, (10.0, 42.0));
    let svg = plot.figure.render_svg().unwrap();
    assert!(svg.contains("<svg"));
}

#[test]
fn summary_depths_are_limited_to_the_plotted_window() {
    let summary = [5.0, 10.0, 30.0, 42.0, 60.0];
    let plot = ani_depthplot_from(base_contribution(), &summary, &options()).unwrap();
    // half-open window: dmin inclusive, dmax exclusive
    assert_eq!(plot.figure.summary_depths, vec![10.0, 30.0]);
}

#[test]
fn explicit_bounds_set_the_depth_axis() {
    let mut opts = options();
    opts.dmin = Some(5.0);
    opts.dmax = Some(50.0);
    let plot = ani_depthplot_from(base_contribution(), &[], &opts).unwrap();
    assert_eq!(plot.figure.depth_range, (5.0, 50.0));
}

// ---------------------------------------------------------------------------
// File-based entry point
// ---------------------------------------------------------------------------

fn write_tables(dir: &std::path::Path) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(
        dir.join("specimens.txt"),
        "tab\tspecimens\n\
         specimen\tsample\taniso_s\taniso_s_n_measurements\taniso_s_sigma\n\
         sp1\tsa1\t0.340000:0.333333:0.326667:0.001:0.0:0.0\t15\t0.002\n\
         sp2\tsa2\t0.336000:0.334000:0.330000:0.0:0.001:0.0\t15\t0.002\n",
    )
    .unwrap();
    std::fs::write(
        dir.join("samples.txt"),
        "tab\tsamples\n\
         sample\tsite\tcore_depth\n\
         sa1\tst1\t10.0\n\
         sa2\tst2\t42.0\n",
    )
    .unwrap();
    std::fs::write(
        dir.join("sites.txt"),
        "tab\tsites\n\
         site\tlocation\tcore_depth\n\
         st1\tHole A\t10.0\n\
         st2\tHole A\t42.0\n",
    )
    .unwrap();
}

fn scratch_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("ani_depthplot_{}_{name}", std::process::id()))
}

#[test]
fn files_on_disk_produce_a_plot() {
    let dir = scratch_dir("files");
    write_tables(&dir);

    let opts = DepthPlotOptions {
        dir_path: dir.clone(),
        ..Default::default()
    };
    let plot = ani_depthplot(&opts).unwrap();
    assert_eq!(plot.figure.panels.len(), 4);
    assert_eq!(plot.file_names[0], "Hole A_ani_depthplot.svg");

    let saved = plot.save(&dir).unwrap();
    let svg = std::fs::read_to_string(saved).unwrap();
    assert!(svg.contains("<svg"));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn unreadable_age_file_falls_back_to_samples() {
    let dir = scratch_dir("bad_age");
    write_tables(&dir);

    let opts = DepthPlotOptions {
        dir_path: dir.clone(),
        age_file: Some("no_such_ages.txt".into()),
        depth_scale: DepthScale::Age,
        ..Default::default()
    };
    let plot = ani_depthplot(&opts).unwrap();
    // Fell back to the samples-based core depth scale.
    assert_eq!(plot.figure.y_label, "Depth (mbsf)");

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn age_file_takes_precedence_over_samples() {
    let dir = scratch_dir("ages");
    write_tables(&dir);
    std::fs::write(
        dir.join("ages.txt"),
        "tab\tages\n\
         sample\tage\tage_unit\n\
         sa1\t0.8\tMa\n\
         sa2\t2.1\tMa\n",
    )
    .unwrap();

    let opts = DepthPlotOptions {
        dir_path: dir.clone(),
        age_file: Some("ages.txt".into()),
        ..Default::default()
    };
    let plot = ani_depthplot(&opts).unwrap();
    assert_eq!(plot.figure.y_label, "Age (Ma)");
    assert_eq!(plot.figure.depth_range, (0.8, 2.1));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn summary_csv_adds_guide_depths() {
    let dir = scratch_dir("summary");
    write_tables(&dir);
    std::fs::write(
        dir.join("core_summary.csv"),
        "Core,Top depth cored CSF (m)\n1H,10.0\n2H,25.5\n3H,99.0\n",
    )
    .unwrap();

    let opts = DepthPlotOptions {
        dir_path: dir.clone(),
        sum_file: Some("core_summary.csv".into()),
        ..Default::default()
    };
    let plot = ani_depthplot(&opts).unwrap();
    assert_eq!(plot.figure.summary_depths, vec![10.0, 25.5]);

    std::fs::remove_dir_all(&dir).unwrap();
}
