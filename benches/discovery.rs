// benches/discovery.rs
use criterion::{Criterion, black_box, criterion_group, criterion_main};

use sisab_scrape::catalog::discover_one_shot;
use sisab_scrape::core::html::read_partial;
use sisab_scrape::{CsvEnvelope, Field, RowPolicy};

use scraper::Html;

fn landing_page(options: usize) -> String {
    let mut select = String::from(r#"<select id="coIndicador"><option value="">Selecione</option>"#);
    for i in 0..options {
        select.push_str(&format!(r#"<option value="{i}">Indicador {i} - descrição longa</option>"#));
    }
    select.push_str("</select>");
    format!(
        r#"<html><body><form id="j_idt50">{select}
        <input type="hidden" id="javax.faces.ViewState" value="-123:456"/></form></body></html>"#
    )
}

fn partial(options: usize) -> String {
    let mut select = String::from(r#"<select id="municipios">"#);
    for i in 0..options {
        select.push_str(&format!(r#"<option value="{}">Município {i}</option>"#, 1_200_000 + i));
    }
    select.push_str("</select>");
    format!(
        r#"<?xml version='1.0' encoding='UTF-8'?><partial-response><changes><update id="regioes"><![CDATA[<div id="regioes">{select}</div>]]></update><update id="javax.faces.ViewState"><![CDATA[-123:456]]></update></changes></partial-response>"#
    )
}

fn csv(rows: usize) -> String {
    let mut body = String::from("Relatorio\r\n\r\n\r\nUF;IBGE;Municipio;Valor\r\n");
    for i in 0..rows {
        body.push_str(&format!("AC;{};Município {i};{}\r\n", 1_200_000 + i, i % 100));
    }
    body.push_str("\r\n\r\nFonte: SISAB");
    body
}

fn bench_discovery(c: &mut Criterion) {
    let page = landing_page(50);
    c.bench_function("one_shot_catalog", |b| {
        b.iter(|| {
            let doc = Html::parse_document(black_box(&page));
            let opts = discover_one_shot(&doc, Field::Index).unwrap();
            black_box(opts.len())
        })
    });

    let body = partial(800);
    c.bench_function("partial_fragments", |b| {
        b.iter(|| {
            let fragments = read_partial(black_box(&body)).unwrap();
            black_box(fragments.len())
        })
    });

    let export = csv(5_000);
    c.bench_function("csv_envelope_rows", |b| {
        b.iter(|| {
            let env = CsvEnvelope::parse(black_box(&export)).unwrap();
            black_box(env.render(&RowPolicy::DataOnly).len())
        })
    });
}

criterion_group!(benches, bench_discovery);
criterion_main!(benches);
