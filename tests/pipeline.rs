use std::fs;
use std::path::Path;

use hydrostat::app::run_report;
use hydrostat::cli::ReportArgs;
use hydrostat::config::Config;
use hydrostat::domain::{PeriodKey, Variable};

/// Write the five datasets in their native layouts under `dir`.
fn write_datasets(dir: &Path) {
    let mut flow = String::from("CodigoEstacion,Fecha,Valor\n");
    let mut humidity = String::from("Fecha,Valor\n");
    let mut evaporation = String::from("Fecha,Valor\n");
    let mut precipitation = String::from("system:time_start,precipitation\n");
    let mut temperature = String::from("Estacion: 2120516\nVariable: TMIN\nFecha,Calidad,Valor\n\n");

    for year in 2015..=2020 {
        for month in 1..=12u32 {
            let seasonal = f64::from(month);
            let drift = f64::from(year - 2015);
            flow.push_str(&format!("2120516,{year}-{month:02}-01,{:.2}\n", 40.0 + 3.0 * seasonal + drift));
            humidity.push_str(&format!("{year}-{month:02}-10 00:00:00,{:.1}\n", 80.0 + seasonal));
            for day in [5, 20] {
                evaporation.push_str(&format!("{year}-{month:02}-{day:02},{:.1}\n", 2.0 + seasonal / 4.0));
            }
            let ts = chrono::NaiveDate::from_ymd_opt(year, month, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
                .and_utc()
                .timestamp_millis();
            precipitation.push_str(&format!("{ts},{:.1}\n", 100.0 + 10.0 * seasonal));
            temperature.push_str(&format!("{year}-{month:02}-01,1,{:.1}\n", 8.0 + seasonal / 2.0 - drift / 10.0));
        }
    }
    // A few broken rows that must be dropped, not fatal.
    flow.push_str("2120516,,12.0\n2120516,2021-01-01,\n");

    let write = |rel: &str, text: &str| {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    };
    write("caudal.csv", &flow);
    write("humedad.csv", &humidity);
    write("evaporacion.csv", &evaporation);
    write("lluvia.csv", &precipitation);
    write("tmin/tmin.csv", &temperature);
}

fn config_for(data_dir: &Path, output_dir: &Path) -> Config {
    let text = format!(
        r#"
        data_dir = "{data}"
        output_dir = "{out}"

        [sources.flow]
        layout = "columns"
        path = "caudal.csv"
        date_column = "Fecha"
        value_column = "Valor"

        [sources.min_temperature]
        layout = "metadata"
        path = "tmin/tmin.csv"
        header_prefix = "Fecha"
        date_index = 0
        value_index = 2

        [sources.relative_humidity]
        layout = "columns"
        path = "humedad.csv"
        date_column = "Fecha"
        value_column = "Valor"

        [sources.evaporation]
        layout = "columns"
        path = "evaporacion.csv"
        date_column = "Fecha"
        value_column = "Valor"

        [sources.precipitation]
        layout = "columns"
        path = "lluvia.csv"
        date_column = "system:time_start"
        value_column = "precipitation"
        "#,
        data = data_dir.display().to_string().replace('\\', "/"),
        out = output_dir.display().to_string().replace('\\', "/"),
    );
    Config::from_toml(&text).unwrap()
}

#[test]
fn report_runs_every_variable_and_exports() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_datasets(data.path());
    let config = config_for(data.path(), &out.path().join("figuras"));

    let args = ReportArgs {
        no_charts: true,
        export: true,
        variables: vec![],
    };
    let results = run_report(&config, &args).unwrap();

    let order: Vec<Variable> = results.iter().map(|(v, _)| *v).collect();
    assert_eq!(order, Variable::ALL.to_vec());

    for (variable, result) in &results {
        let output = result.as_ref().unwrap_or_else(|e| panic!("{variable}: {e}"));
        assert_eq!(output.monthly.len(), 12, "{variable}");
        assert_eq!(output.quarterly.len(), 4, "{variable}");
        assert_eq!(output.annual.len(), 6, "{variable}");
        assert_eq!(
            output.intervals.iter().map(|c| c.abs_freq).sum::<usize>(),
            output.statistics.n,
            "{variable}"
        );
        assert!(output.written.iter().all(|p| p.exists()));
    }

    let flow = results[0].1.as_ref().unwrap();
    assert_eq!(flow.rows_dropped, 2);
    assert_eq!(flow.statistics.n, 72);
    // January across 2015..=2020: 43, 44, ... 48.
    assert_eq!(flow.monthly[0].period, PeriodKey::Month(1));
    assert!((flow.monthly[0].mean_value - 45.5).abs() < 1e-9);

    let evaporation = results[3].1.as_ref().unwrap();
    assert_eq!(evaporation.statistics.n, 144);
    assert_eq!(evaporation.frequency[0].count, 12);

    let summary = out.path().join("figuras").join("precipitacion_resumen.json");
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(summary).unwrap()).unwrap();
    assert_eq!(json["statistics"]["n"], 72);
    assert_eq!(json["regimes"]["monthly"].as_array().unwrap().len(), 12);
}

#[test]
fn failed_pipeline_does_not_stop_siblings() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_datasets(data.path());
    fs::remove_file(data.path().join("humedad.csv")).unwrap();
    let config = config_for(data.path(), out.path());

    let args = ReportArgs {
        no_charts: true,
        export: false,
        variables: vec![],
    };
    let results = run_report(&config, &args).unwrap();

    let failed: Vec<Variable> = results.iter().filter(|(_, r)| r.is_err()).map(|(v, _)| *v).collect();
    assert_eq!(failed, vec![Variable::RelativeHumidity]);
    let err = results[2].1.as_ref().unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(err.to_string().starts_with("humedad: "));
}

#[test]
fn charts_are_written_for_selected_variable() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_datasets(data.path());
    let config = config_for(data.path(), out.path());

    let args = ReportArgs {
        no_charts: false,
        export: false,
        variables: vec![Variable::Flow],
    };
    let results = run_report(&config, &args).unwrap();
    assert_eq!(results.len(), 1);
    let flow = results[0].1.as_ref().unwrap();

    for suffix in [
        "mensual",
        "trimestral",
        "anual",
        "boxplot",
        "frec_abs_mensual",
        "frec_abs_acum",
        "frec_rel_mensual",
        "frec_rel_acum",
    ] {
        let path = out.path().join(format!("caudal_{suffix}.png"));
        assert!(path.exists(), "missing {}", path.display());
        assert!(flow.written.contains(&path));
    }
    if hydrostat::plot::text_enabled() {
        assert!(out.path().join("caudal_estadisticas.png").exists());
        assert!(out.path().join("caudal_intervalos.png").exists());
        assert!(out.path().join("caudal_boxplot_stats.png").exists());
    }
    assert!(out.path().join("comparacion_regimenes.png").exists());
}
