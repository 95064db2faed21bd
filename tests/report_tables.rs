//! End-to-end table synthesis over a small measure graph.

mod common;

use common::{B1, direct_leaf, package, range_leaf, with_cash_flows};
use retrofit_report::config::EngineConfig;
use retrofit_report::table::{Grouping, ReportSpec, build_table};

fn spec(headings: &[&str]) -> ReportSpec {
    ReportSpec {
        headings: headings.iter().map(|s| s.to_string()).collect(),
        ..ReportSpec::default()
    }
}

#[test]
fn package_row_reports_aggregate_metrics() {
    // Child A: cost 1000, incentive 100, annual 300. Child B: cost 2000,
    // annual 100, maintenance 50. Aggregate ROI is the per-child sum 33 + 8.
    let measures = vec![package(
        "RTU bundle",
        "HVAC Systems",
        vec![
            direct_leaf("economizer", "HVAC Systems", 1000.0, 100.0, 300.0, 0.0),
            direct_leaf("vfd", "HVAC Systems", 2000.0, 0.0, 100.0, 50.0),
        ],
    )];
    let table = build_table(
        &spec(&["name", "project-cost", "incentive", "annual-savings", "roi"]),
        &measures,
        B1,
        &EngineConfig::default(),
    );
    assert_eq!(table.rows.len(), 1);
    let row = &table.rows[0];
    assert_eq!(row[0], "RTU bundle");
    assert_eq!(row[1], "3,000");
    assert_eq!(row[2], "100");
    assert_eq!(row[3], "400");
    assert_eq!(row[4], "41");
}

#[test]
fn spec_parsed_from_toml_drives_grouping_and_totals() {
    let report_spec = ReportSpec::from_toml_str(
        r#"
        headings = ["name", "project-cost", "annual-savings"]
        grouping = "groupCategory"
        totalRow = true

        [filter]
        category = ["Lighting", "Controls"]
        "#,
    )
    .expect("valid spec");

    let measures = vec![
        direct_leaf("LED retrofit", "Lighting", 5000.0, 0.0, 800.0, 0.0),
        direct_leaf("occupancy sensors", "Lighting", 1200.0, 0.0, 150.0, 0.0),
        direct_leaf("BAS schedule", "Controls", 900.0, 0.0, 400.0, 0.0),
        direct_leaf("low-flow fixtures", "Water Conservation", 300.0, 0.0, 60.0, 0.0),
    ];
    let table = build_table(&report_spec, &measures, B1, &EngineConfig::default());

    // Water Conservation is filtered out; Controls sorts before Lighting in
    // the default category order; one totals row follows.
    assert_eq!(table.rows.len(), 3);
    assert_eq!(table.rows[0][0], "Controls");
    assert_eq!(table.rows[0][1], "900");
    assert_eq!(table.rows[1][0], "Lighting");
    assert_eq!(table.rows[1][1], "6,200");
    let totals = &table.rows[2];
    assert_eq!(totals[0], "Total");
    assert_eq!(totals[1], "7,100");
    assert_eq!(totals[2], "1,350");
}

#[test]
fn range_measures_render_and_total_as_intervals() {
    let measures = vec![
        range_leaf("boiler tune-up", "Heating Plant", 10.0, 20.0),
        range_leaf("pipe insulation", "Heating Plant", 5.0, 15.0),
    ];
    let mut report_spec = spec(&["name", "annual-savings"]);
    report_spec.total_row = true;
    let table = build_table(&report_spec, &measures, B1, &EngineConfig::default());
    assert_eq!(table.rows[0][1], "10 - 20");
    assert_eq!(table.rows[1][1], "5 - 15");
    assert_eq!(table.rows[2][1], "15 - 35");
}

#[test]
fn npv_and_sir_headings_carry_investment_period() {
    let measures = vec![with_cash_flows(
        direct_leaf("chiller upgrade", "Cooling Plant", 10000.0, 0.0, 1500.0, 0.0),
        6.67,
        [1400.0, 1300.0],
        2700.0,
        1.27,
    )];
    let table = build_table(
        &spec(&["name", "npv", "sir", "simple-payback"]),
        &measures,
        B1,
        &EngineConfig::default(),
    );
    assert_eq!(table.headings[1], "NPV (2-year)");
    assert_eq!(table.headings[2], "SIR (2-year)");
    assert_eq!(table.rows[0][1], "2,700");
    assert_eq!(table.rows[0][2], "1.27");
    assert_eq!(table.rows[0][3], "6.67");
}

#[test]
fn group_project_location_merges_by_name_and_location() {
    let mut east = direct_leaf("LED retrofit", "Lighting", 1000.0, 0.0, 100.0, 0.0);
    east.locations = vec!["East Wing".into()];
    let mut east2 = direct_leaf("LED retrofit", "Lighting", 500.0, 0.0, 50.0, 0.0);
    east2.locations = vec!["East Wing".into()];
    let mut west = direct_leaf("LED retrofit", "Lighting", 800.0, 0.0, 80.0, 0.0);
    west.locations = vec!["West Wing".into()];

    let mut report_spec = spec(&["name", "location", "project-cost"]);
    report_spec.grouping = Grouping::GroupProjectLocation;
    let table = build_table(
        &report_spec,
        &[east, east2, west],
        B1,
        &EngineConfig::default(),
    );
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[0][1], "East Wing");
    assert_eq!(table.rows[0][2], "1,500");
    assert_eq!(table.rows[1][1], "West Wing");
    assert_eq!(table.rows[1][2], "800");
}

#[test]
fn sorting_descending_by_savings() {
    let measures = vec![
        direct_leaf("small", "Lighting", 100.0, 0.0, 50.0, 0.0),
        direct_leaf("large", "Lighting", 100.0, 0.0, 500.0, 0.0),
        direct_leaf("medium", "Lighting", 100.0, 0.0, 200.0, 0.0),
    ];
    let report_spec = ReportSpec::from_json_str(
        r#"{
            "headings": ["name", "annual-savings"],
            "orderBy": "annual-savings",
            "order": "desc"
        }"#,
    )
    .expect("valid spec");
    let table = build_table(&report_spec, &measures, B1, &EngineConfig::default());
    let names: Vec<&str> = table.rows.iter().map(|r| r[0].as_str()).collect();
    assert_eq!(names, vec!["large", "medium", "small"]);
}
