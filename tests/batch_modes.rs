// tests/batch_modes.rs
mod common;

use std::fs;
use std::path::PathBuf;

use common::{STATES, csv, partial, session};
use sisab_scrape::batch::{self, Combination};
use sisab_scrape::core::net::RawResponse;
use sisab_scrape::file::{PerCombinationSink, SingleFileSink};
use sisab_scrape::progress::{NullProgress, Progress};
use sisab_scrape::{AreaLevel, BatchPlan, Error, FailurePolicy};

fn tmp_dir(name: &str) -> PathBuf {
    let mut p = std::env::temp_dir();
    p.push(format!("sisab_batch_{}_{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&p);
    p
}

fn states() -> RawResponse {
    partial("tx", "estados", STATES)
}

fn state_plan(indices: &[&str]) -> BatchPlan {
    let mut plan = BatchPlan::new(AreaLevel::State);
    plan.indices = indices.iter().map(|s| s.to_string()).collect();
    plan
}

#[derive(Default)]
struct Recorder {
    total: usize,
    done: Vec<String>,
    failed: Vec<String>,
    finished: bool,
}

impl Progress for Recorder {
    fn begin(&mut self, total: usize) {
        self.total = total;
    }
    fn item_done(&mut self, combo: &Combination) {
        self.done.push(combo.unit.value.clone());
    }
    fn item_failed(&mut self, combo: &Combination, _error: &str) {
        self.failed.push(combo.unit.value.clone());
    }
    fn finish(&mut self) {
        self.finished = true;
    }
}

#[test]
fn global_file_keeps_only_the_first_header() {
    let mut s = session(vec![states(), states(), csv(&["AC;1"]), states(), csv(&["AL;2"])]);
    let mut sink = SingleFileSink::new(Vec::<u8>::new());
    let mut rec = Recorder::default();

    let summary = batch::run(&mut s, &state_plan(&["1"]), &mut sink, Some(&mut rec)).unwrap();

    assert_eq!(summary.exported, 2);
    assert_eq!(rec.total, 2);
    assert_eq!(rec.done, ["AC", "AL"]);
    assert!(rec.finished);

    let out = String::from_utf8(sink.into_inner()).unwrap();
    assert_eq!(out, "Relatorio SISAB\nUF;Valor\nAC;1\nAL;2\n");
    assert_eq!(out.matches("UF;Valor").count(), 1);
}

#[test]
fn each_group_restarts_its_header() {
    let mut s = session(vec![
        states(),
        states(), csv(&["AC;1"]),
        states(), csv(&["AL;2"]),
        states(), csv(&["AC;3"]),
        states(), csv(&["AL;4"]),
    ]);
    let mut sink = SingleFileSink::new(Vec::<u8>::new());

    let summary = batch::run(&mut s, &state_plan(&[]), &mut sink, Some(&mut NullProgress)).unwrap();
    assert_eq!(summary.exported, 4);

    let out = String::from_utf8(sink.into_inner()).unwrap();
    assert_eq!(
        out,
        "Relatorio SISAB\nUF;Valor\nAC;1\nAL;2\n\nRelatorio SISAB\nUF;Valor\nAC;3\nAL;4\n"
    );

    let exports: Vec<_> = s.transport().sent.iter().filter(|r| r.param("j_idt84").is_some()).collect();
    let indicators: Vec<_> = exports.iter().map(|r| r.param("coIndicador").unwrap()).collect();
    assert_eq!(indicators, ["1", "1", "2", "2"]);
}

#[test]
fn per_combination_files_keep_their_header() {
    let dir = tmp_dir("files");
    let mut s = session(vec![states(), states(), csv(&["AC;1"]), states(), csv(&["AL;2"])]);
    let mut sink = PerCombinationSink::new(&dir).unwrap();

    batch::run(&mut s, &state_plan(&["1"]), &mut sink, None).unwrap();

    let written = sink.written().to_vec();
    assert_eq!(written.len(), 2);
    assert_eq!(
        written[0].file_name().unwrap().to_string_lossy(),
        "Acre_2023_Q1_Pré-Natal_6_consultas_Todas_as_equipes.csv"
    );
    assert_eq!(fs::read_to_string(&written[0]).unwrap(), "UF;Valor\nAC;1\n");
    assert_eq!(fs::read_to_string(&written[1]).unwrap(), "UF;Valor\nAL;2\n");
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn failure_aborts_by_default() {
    let broken = RawResponse { status: 200, content_type: "text/csv".into(), set_cookies: Vec::new(), body: "x".into() };
    let mut s = session(vec![states(), states(), broken, states(), csv(&["AL;2"])]);
    let mut sink = SingleFileSink::new(Vec::<u8>::new());
    let mut rec = Recorder::default();

    let err = batch::run(&mut s, &state_plan(&["1"]), &mut sink, Some(&mut rec)).unwrap_err();
    assert!(matches!(err, Error::EnvelopeFormat { .. }));
    assert!(rec.finished);
    assert!(sink.into_inner().is_empty());
}

#[test]
fn continue_policy_records_failures_and_moves_the_header() {
    let broken = RawResponse { status: 200, content_type: "text/csv".into(), set_cookies: Vec::new(), body: "x".into() };
    let mut s = session(vec![states(), states(), broken, states(), csv(&["AL;2"])]);
    let mut plan = state_plan(&["1"]);
    plan.on_error = FailurePolicy::Continue;
    let mut sink = SingleFileSink::new(Vec::<u8>::new());
    let mut rec = Recorder::default();

    let summary = batch::run(&mut s, &plan, &mut sink, Some(&mut rec)).unwrap();
    assert_eq!(summary.exported, 1);
    assert_eq!(summary.failed.len(), 1);
    assert!(summary.failed[0].0.starts_with("Acre"));
    assert_eq!(rec.failed, ["AC"]);
    assert_eq!(String::from_utf8(sink.into_inner()).unwrap(), "Relatorio SISAB\nUF;Valor\nAL;2\n");
}

#[test]
fn unknown_filter_value_fails_before_exporting() {
    let mut s = session(vec![states()]);
    let mut plan = state_plan(&["1"]);
    plan.units = vec!["ZZ".into()];
    let mut sink = SingleFileSink::new(Vec::<u8>::new());

    let err = batch::run(&mut s, &plan, &mut sink, None).unwrap_err();
    assert!(matches!(err, Error::InvalidSelection { ref value, .. } if value == "ZZ"));
    assert!(s.transport().sent.iter().all(|r| r.param("j_idt84").is_none()));
}

#[test]
fn municipality_level_filters_each_state() {
    let by_mun = || partial("tx", "estadoMunicipio", STATES);
    let mut s = session(vec![
        by_mun(),
        by_mun(),
        partial("tx", "municipios", &[("1200013", "Acrelândia"), ("1200054", "Assis Brasil")]),
        csv(&["1200054;5"]),
        by_mun(),
        partial("tx", "municipios", &[("2700102", "Água Branca")]),
    ]);
    let mut plan = BatchPlan::new(AreaLevel::Municipality);
    plan.indices = vec!["1".into()];
    plan.municipalities = vec!["1200054".into()];
    let mut sink = SingleFileSink::new(Vec::<u8>::new());

    let summary = batch::run(&mut s, &plan, &mut sink, None).unwrap();
    assert_eq!(summary.exported, 1);
    assert_eq!(summary.skipped, 1);

    let export = s.transport().sent.iter().find(|r| r.param("j_idt84").is_some()).unwrap();
    assert_eq!(export.param("selectLinha"), Some("ibge"));
    assert_eq!(export.param("estadoMunicipio"), Some("AC"));
    assert_eq!(export.params("municipios"), ["1200054"]);
    assert_eq!(String::from_utf8(sink.into_inner()).unwrap(), "Relatorio SISAB\nUF;Valor\n1200054;5\n");
}

#[test]
fn region_level_exports_each_region() {
    let regions = || partial("tx", "regiao", &[("1", "Norte"), ("2", "Nordeste")]);
    let mut s = session(vec![regions(), regions(), csv(&["N;1"]), regions(), csv(&["NE;2"])]);
    let mut plan = BatchPlan::new(AreaLevel::Region);
    plan.indices = vec!["1".into()];
    let mut sink = SingleFileSink::new(Vec::<u8>::new());
    let mut rec = Recorder::default();

    let summary = batch::run(&mut s, &plan, &mut sink, Some(&mut rec)).unwrap();
    assert_eq!(summary.exported, 2);
    assert_eq!(rec.done, ["1", "2"]);

    let exports: Vec<_> = s.transport().sent.iter().filter(|r| r.param("j_idt84").is_some()).collect();
    assert!(exports.iter().all(|r| r.param("selectLinha") == Some("regiao")));
    assert_eq!(exports[0].params("regiao"), ["1"]);
    assert_eq!(exports[1].params("regiao"), ["2"]);
    assert_eq!(String::from_utf8(sink.into_inner()).unwrap(), "Relatorio SISAB\nUF;Valor\nN;1\nNE;2\n");
}

#[test]
fn national_level_is_a_single_unit() {
    let mut s = session(vec![csv(&["BR;9"])]);
    let mut plan = BatchPlan::new(AreaLevel::National);
    plan.indices = vec!["2".into()];
    let mut sink = SingleFileSink::new(Vec::<u8>::new());
    let mut rec = Recorder::default();

    let summary = batch::run(&mut s, &plan, &mut sink, Some(&mut rec)).unwrap();
    assert_eq!(summary.exported, 1);
    assert_eq!(rec.done, ["nacional"]);
    assert_eq!(s.transport().sent.len(), 3);
}
