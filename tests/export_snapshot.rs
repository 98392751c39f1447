use std::collections::{BTreeMap, HashMap};

use bench_export::core::machine::MachineInfo;
use bench_export::core::schema::{ExportDocument, Percentile, RawMetricResult};
use bench_export::export::{FixedClock, InfluxCsvFormatter, assemble, to_json};
use time::OffsetDateTime;

fn machine() -> MachineInfo {
    MachineInfo {
        hostname: "my host".to_string(),
        processor_type: "Intel Xeon".to_string(),
        processors: 16,
        memory: 34_359_738_368,
        kernel_version: "6.1.0 generic".to_string(),
    }
}

fn raw(metric: &str, units: &str, values: &[(Percentile, u64)], measurements: u64, warmup: u64) -> RawMetricResult {
    RawMetricResult {
        metric: metric.to_string(),
        units: units.to_string(),
        percentiles: values.iter().copied().collect(),
        measurements,
        warmup_iterations: warmup,
    }
}

fn formatter() -> InfluxCsvFormatter<FixedClock> {
    InfluxCsvFormatter::with_clock(FixedClock(
        OffsetDateTime::from_unix_timestamp(1_714_564_800).unwrap(),
    ))
}

fn alloc_document() -> ExportDocument {
    let mut results = HashMap::new();
    results.insert(
        "Alloc".to_string(),
        vec![raw(
            "throughput",
            "ops/s",
            &[(Percentile::P0, 10), (Percentile::P50, 20), (Percentile::P100, 30)],
            3,
            1,
        )],
    );
    assemble(&machine(), "AllocBenchmarks", &results)
}

#[test]
fn test_alloc_scenario_csv_snapshot() {
    let csv = formatter().format(&alloc_document()).unwrap();
    let expected = "\
#constant measurement,AllocBenchmarks
#constant tag,hostName,my-host
#constant tag,processors,16
#constant tag,processorType,Intel-Xeon
#constant tag,memory,34359738368
#constant tag,kernelVersion,6.1.0-generic
#datatype tag,tag,tag,double,double,long,long,dateTime
metric,unit,test,value,test_average,iterations,warmup_iterations,time
throughput,ops/s,Alloc,10,20.0,3,1,2024-05-01T12:00:00Z
throughput,ops/s,Alloc,20,20.0,3,1,2024-05-01T12:00:00Z
throughput,ops/s,Alloc,30,20.0,3,1,2024-05-01T12:00:00Z
";
    assert_eq!(csv, expected);
}

#[test]
fn test_alloc_scenario_json() {
    let doc = alloc_document();
    assert_eq!(doc.tests[0].metrics[0].average, 20.0);

    let value: serde_json::Value = serde_json::from_slice(&to_json(&doc).unwrap()).unwrap();
    let metric = &value["benchmarks"][0]["data"][0];
    assert_eq!(metric["metricsdata"], serde_json::json!([10, 20, 30]));
    assert_eq!(metric["average"], 20.0);
    assert_eq!(value["benchmarks"][0]["iterations"], 3);
    assert_eq!(value["benchmarks"][0]["warmupIterations"], 1);
    assert_eq!(value["benchmarkMachine"]["hostname"], "my host");
}

#[test]
fn test_line_count_matches_samples() {
    let mut results = BTreeMap::new();
    results.insert(
        "B".to_string(),
        vec![
            raw("Time (wall clock)", "ns", &[(Percentile::P0, 1), (Percentile::P25, 2), (Percentile::P99, 9)], 5, 1),
            raw("Malloc (total)", "#", &[(Percentile::P50, 4)], 5, 1),
        ],
    );
    results.insert(
        "A".to_string(),
        vec![
            raw("empty", "#", &[], 2, 0),
            raw("Memory (resident peak)", "K", &[(Percentile::P0, 100), (Percentile::P100, 200)], 2, 0),
        ],
    );

    let doc = assemble(&machine(), "Suite", &results);
    assert_eq!(doc.sample_count(), 6);

    let csv = formatter().format(&doc).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 1 + 5 + 1 + 1 + doc.sample_count());

    // Tests and metrics are emitted in sorted order, spaces stripped from metric names.
    let metrics: Vec<(&str, &str)> = lines[8..]
        .iter()
        .map(|l| {
            let mut fields = l.split(',');
            let metric = fields.next().unwrap();
            let test = fields.nth(1).unwrap();
            (test, metric)
        })
        .collect();
    assert_eq!(
        metrics,
        vec![
            ("A", "Memory(residentpeak)"),
            ("A", "Memory(residentpeak)"),
            ("B", "Malloc(total)"),
            ("B", "Time(wallclock)"),
            ("B", "Time(wallclock)"),
            ("B", "Time(wallclock)"),
        ]
    );
}

#[test]
fn test_json_roundtrip_matches_document() {
    let mut results = BTreeMap::new();
    for name in ["zeta", "Alpha", "beta"] {
        results.insert(
            name.to_string(),
            vec![
                raw("b metric", "ns", &[(Percentile::P25, 3), (Percentile::P75, 8)], 4, 2),
                raw("a metric", "ns", &[(Percentile::P90, 11)], 4, 2),
            ],
        );
    }
    let doc = assemble(&machine(), "Suite", &results);
    let parsed: ExportDocument = serde_json::from_slice(&to_json(&doc).unwrap()).unwrap();
    assert_eq!(parsed, doc);

    let names: Vec<&str> = parsed.tests.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "beta", "zeta"]);
    assert_eq!(parsed.tests[0].metrics[0].metric, "a metric");
}

#[test]
fn test_same_input_renders_identical_bytes() {
    let first = formatter().format(&alloc_document()).unwrap();
    let second = formatter().format(&alloc_document()).unwrap();
    assert_eq!(first, second);
    assert_eq!(to_json(&alloc_document()).unwrap(), to_json(&alloc_document()).unwrap());
}
