// tests/common/mod.rs
#![allow(dead_code)]
use std::collections::VecDeque;
use std::io;

use sisab_scrape::config::options::SiteConfig;
use sisab_scrape::core::net::{Method, RawResponse, Transport};
use sisab_scrape::error::TransportError;
use sisab_scrape::Session;

/// One request as the session sent it.
#[derive(Clone, Debug)]
pub struct Sent {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub form: Vec<(String, String)>,
}

impl Sent {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.form.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn params(&self, key: &str) -> Vec<&str> {
        self.form.iter().filter(|(k, _)| k == key).map(|(_, v)| v.as_str()).collect()
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }
}

/// Replays canned responses in order and records every request.
#[derive(Default)]
pub struct ScriptedTransport {
    pub replies: VecDeque<RawResponse>,
    pub sent: Vec<Sent>,
}

impl ScriptedTransport {
    pub fn new(replies: impl IntoIterator<Item = RawResponse>) -> Self {
        Self { replies: replies.into_iter().collect(), sent: Vec::new() }
    }
}

impl Transport for ScriptedTransport {
    fn send(
        &mut self,
        method: Method,
        url: &str,
        headers: &[(String, String)],
        form: &[(String, String)],
    ) -> Result<RawResponse, TransportError> {
        self.sent.push(Sent {
            method,
            url: url.to_string(),
            headers: headers.to_vec(),
            form: form.to_vec(),
        });
        self.replies
            .pop_front()
            .ok_or_else(|| TransportError::Io(io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted")))
    }
}

/* ---------------- Fixtures ---------------- */

fn options_html(id: &str, pairs: &[(&str, &str)]) -> String {
    let mut s = format!(r#"<select id="{id}" name="{id}"><option value="">Selecione</option>"#);
    for (v, l) in pairs {
        s.push_str(&format!(r#"<option value="{v}">{l}</option>"#));
    }
    s.push_str("</select>");
    s
}

pub fn page(token: &str) -> RawResponse {
    let body = format!(
        r#"<html><body><form id="j_idt50">{}{}{}{}
        <input type="hidden" name="javax.faces.ViewState" id="javax.faces.ViewState" value="{token}"/>
        </form></body></html>"#,
        options_html(
            "selectLinha",
            &[("nacional", "Brasil"), ("regiao", "Região"), ("uf", "Estado"), ("ibge", "Municipio")]
        ),
        options_html("coIndicador", &[("1", "Pré-Natal (6 consultas)"), ("2", "Pré-Natal (Sífilis e HIV)")]),
        options_html("quadrimestre", &[("202301", "2023 Q1")]),
        options_html("visaoEquipe", &[("0", "Todas as equipes")]),
    );
    RawResponse {
        status: 200,
        content_type: "text/html;charset=ISO-8859-1".into(),
        set_cookies: vec!["JSESSIONID=abc123; Path=/; Secure".into(), "BIGipServer=42; path=/".into()],
        body,
    }
}

/// Partial response re-rendering `regioes` with a select of `pairs`.
pub fn partial(token: &str, select_id: &str, pairs: &[(&str, &str)]) -> RawResponse {
    let body = format!(
        r#"<?xml version='1.0' encoding='UTF-8'?>
<partial-response id="j_id1"><changes><update id="regioes"><![CDATA[<div id="regioes">{}</div>]]></update><update id="javax.faces.ViewState"><![CDATA[{token}]]></update></changes></partial-response>"#,
        options_html(select_id, pairs)
    );
    RawResponse { status: 200, content_type: "text/xml;charset=UTF-8".into(), set_cookies: Vec::new(), body }
}

/// Partial response that only refreshes the token.
pub fn bare_partial(token: &str) -> RawResponse {
    let body = format!(
        r#"<?xml version='1.0' encoding='UTF-8'?>
<partial-response><changes><update id="javax.faces.ViewState"><![CDATA[{token}]]></update></changes></partial-response>"#
    );
    RawResponse { status: 200, content_type: "text/xml;charset=UTF-8".into(), set_cookies: Vec::new(), body }
}

pub fn csv(rows: &[&str]) -> RawResponse {
    let body = format!(
        "Relatorio SISAB\r\n\r\n\r\nUF;Valor\r\n{}\r\n\r\n\r\nFonte: SISAB",
        rows.join("\r\n")
    );
    RawResponse { status: 200, content_type: "text/csv".into(), set_cookies: Vec::new(), body }
}

pub const STATES: &[(&str, &str)] = &[("AC", "Acre"), ("AL", "Alagoas")];

/// Session after landing page (`t0`) and prime postback (`t1`), plus `rest` scripted replies.
pub fn session(rest: Vec<RawResponse>) -> Session<ScriptedTransport> {
    let mut replies = vec![page("t0"), bare_partial("t1")];
    replies.extend(rest);
    Session::connect(ScriptedTransport::new(replies), SiteConfig::default()).unwrap()
}
